/// Unit tests for the public streak and growth API
mod growth_tests;
mod streak_tests;
