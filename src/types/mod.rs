pub mod classification;
pub mod prompt;
pub mod report;
pub mod request;
pub mod research;
pub mod resource;
pub mod search;
pub mod use_case;
