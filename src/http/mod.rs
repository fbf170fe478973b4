pub mod access;
pub mod cookie;
pub mod domain;
pub mod meta;
pub mod request;
pub mod response;
pub mod safety;
