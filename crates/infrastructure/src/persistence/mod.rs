//! File-based storage for suites.

mod suite_file;

pub use suite_file::{
    DEFAULT_SUITE_FILE, LoadError, SAMPLE_SUITE_YAML, SUITE_WRAPPER_KEY, SuiteFormat, load_suite,
    parse_suite, suite_from_value, write_sample_suite,
};
