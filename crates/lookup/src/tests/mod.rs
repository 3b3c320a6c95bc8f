mod cache_tests;
mod helpers;
