use super::*;

#[test]
fn exit_codes_are_distinct() {
    assert_ne!(EXIT_SUCCESS, EXIT_TEST_FAILURE);
    assert_ne!(EXIT_SUCCESS, EXIT_CONFIG_ERROR);
    assert_ne!(EXIT_TEST_FAILURE, EXIT_CONFIG_ERROR);
}

#[test]
fn config_errors_map_to_their_own_exit_code() {
    let err = SaveError::Config("bad".to_string());
    assert!(err.is_config_error());
    assert!(!SaveError::ProcessExecution("boom".to_string()).is_config_error());
}
