mod common;
mod partition_tests;
mod reference_tests;
