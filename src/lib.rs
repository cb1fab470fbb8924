//! Library half of the news scraper: feed discovery, article extraction,
//! and persistence. The `news_scraper` binary is a thin CLI over [`pipeline::run`].

pub mod cli;
pub mod config;
pub mod http;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod utils;
