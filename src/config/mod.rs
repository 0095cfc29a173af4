mod model;
mod parse;
mod properties;
mod resolved;
mod tree;

pub use model::{
    ActualWarningsFormat, ConfigFile, DEFAULT_ACTUAL_WARNINGS_PATTERN, DEFAULT_CONFIG_NAME,
    DEFAULT_EXPECTED_SUFFIX, DEFAULT_EXPECTED_WARNINGS_PATTERN, DEFAULT_TEST_SUFFIX,
    DEFAULT_TIMEOUT_MILLIS, FixAndWarnSection, FixSection, GeneralSection, PluginSection,
    SectionKind, WarnSection,
};
pub use parse::{parse_config_file, parse_config_str};
pub use properties::{PROPERTIES_FILE_NAME, Properties};
pub use resolved::{
    FixAndWarnConfig, FixConfig, GeneralConfig, PluginConfig, ResolvedConfig, WarnConfig,
};
pub use tree::{ConfigNode, ConfigTree, NodeId};
