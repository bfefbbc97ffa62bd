mod challenge_tests;
mod common;
mod score_tests;
mod track_tests;
