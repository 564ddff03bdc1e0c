pub mod backend;
pub mod local;
pub mod manager;
pub mod remote;
