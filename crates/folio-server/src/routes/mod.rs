pub mod clear;
pub mod contact;
pub mod data;
pub mod engagement;
pub mod health;
pub mod notify;
pub mod track;
