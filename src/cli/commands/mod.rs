pub mod clean;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod generate;
pub mod image;
pub mod qc;
pub mod run;
pub mod scrape;
pub mod seo;
