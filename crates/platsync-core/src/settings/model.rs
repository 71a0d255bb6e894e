//! Typed model of the declarative settings document
//!
//! The settings document drives everything the tool does: where entity
//! folders live, which directory trees get scaffolded, how remote documents
//! are sliced into local files, and how local files are reassembled for a
//! push. Modeling it as explicit structs means a malformed document is
//! rejected when it is loaded, not halfway through a sync.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root of the settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Workspace-relative locations, slash-separated
    pub paths: Paths,

    /// Fallback API credentials, lowest precedence
    #[serde(default)]
    pub env: ApiDefaults,

    /// Named directory trees used by the scaffolding commands
    pub structures: Structures,

    /// Named extraction-rule lists used by the pull commands
    pub extract_keys: ExtractKeys,

    /// Named push-file lists used by the push commands
    pub push_structures: PushStructures,

    /// Static documents merged in when a local counterpart is absent
    #[serde(default)]
    pub statics: Statics,
}

/// Workspace-relative paths; segments are `/`-separated and joined
/// platform-appropriately at use sites
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paths {
    pub common_models: String,
    pub common_enums: String,
    pub platforms: String,
    pub server_o_auth: String,
    pub templates: String,
    pub user_config: String,
}

/// Default credentials shipped with the settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefaults {
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// A directory (and its contents) to materialize on disk
///
/// A node with neither subfolders nor files is a plain empty directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    /// Path segment for this directory
    pub name: String,

    #[serde(default)]
    pub folders: Vec<StructureNode>,

    #[serde(default)]
    pub files: Vec<FileSpec>,
}

impl StructureNode {
    /// True when the node describes a bare directory with no contents
    pub fn is_leaf(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// A file to materialize from a template source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    /// Target file name
    pub name: String,

    /// Template path relative to the templates directory
    pub template: String,

    /// Substitutions applied to the template text, in order
    #[serde(default)]
    pub replace: Vec<ReplaceRule>,
}

/// One textual substitution; `to` starts life as a placeholder key and is
/// resolved against a replacement-value mapping before materialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceRule {
    pub from: String,
    pub to: String,
}

/// Maps remote document key paths to one local file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    /// Target file path relative to the entity folder
    pub path: String,

    /// Dot-notation key paths looked up in the source document
    pub keys: Vec<String>,

    /// When true the single extracted value is the file's entire content
    #[serde(default)]
    pub root: bool,

    /// Post-extraction relocation steps, applied in order
    #[serde(default)]
    pub move_to_root: Vec<MoveRule>,
}

/// Relocates a nested value to the top level of the extracted object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRule {
    /// Dot path of the value to relocate
    pub key: String,

    /// Merge the value's own keys into the top level instead of assigning it
    #[serde(default)]
    pub spread: bool,

    /// Explicit top-level key to assign under (defaults to the leaf key)
    #[serde(default)]
    pub destination: Option<String>,
}

/// Ordered list of local files composed into one outgoing document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStructure {
    pub files: Vec<PushFileSpec>,
}

/// How one local file contributes to the outgoing document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushFileSpec {
    /// File path relative to the entity folder
    pub name: String,

    /// Assign the file content under `key` instead of merging it wholesale
    #[serde(default)]
    pub root: bool,

    /// Target key for `root` assignment; may be a dot path when `nested`
    #[serde(default)]
    pub key: Option<String>,

    /// Fill nested containers along the dot path in `key` without
    /// clobbering sibling keys already present
    #[serde(default)]
    pub nested: bool,

    /// Suppress the default merge; the file contributes only through the
    /// explicit operators below
    #[serde(default)]
    pub manual_structure: bool,

    /// Copy these top-level keys from the parsed file into the result
    #[serde(default)]
    pub copy_keys: Vec<String>,

    /// Merge these object-valued keys' own properties into the result root
    #[serde(default)]
    pub spread_to_root: Vec<String>,

    /// Merge this static object into the result
    #[serde(default)]
    pub add_keys: Map<String, Value>,

    /// Move values between dot paths while composing
    #[serde(default)]
    pub rearrange_keys: Vec<RearrangeRule>,
}

/// Moves the value at `from` in the source file to `to` in the result,
/// creating intermediate containers as needed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RearrangeRule {
    pub from: String,
    pub to: String,
}

/// Named directory trees for the scaffolding commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structures {
    pub common_model: StructureNode,
    pub common_enum: StructureNode,
    pub platform_folder: StructureNode,
    pub model: StructureNode,
    pub platform_o_auth: StructureNode,
}

/// Named extraction-rule lists for the pull commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractKeys {
    pub common_model: Vec<ExtractionRule>,
    pub common_enum: Vec<ExtractionRule>,
    pub platform_connection_definition: Vec<ExtractionRule>,
    pub platform: Vec<ExtractionRule>,
    pub platform_detail: Vec<ExtractionRule>,
    pub oauth_connection_definition: Vec<ExtractionRule>,
    pub platform_model_schema: Vec<ExtractionRule>,
    pub platform_model_action: Vec<ExtractionRule>,
    pub platform_schema_page: Vec<ExtractionRule>,
    pub platform_action_page: Vec<ExtractionRule>,
}

/// Named push-file lists for the push commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStructures {
    pub common_models: PushStructure,
    pub common_enums: PushStructure,
    pub platform: PlatformPushStructures,
}

/// Push structures for the platform family of resources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPushStructures {
    pub connection_definition: PushStructure,
    pub platform: PushStructure,
    pub oauth_connection_definition: PushStructure,
    pub schemas: PushStructure,
    pub schema_page: PushStructure,
    pub actions: PushStructure,
    pub action_page: PushStructure,
}

/// Static page documents used when no local page file exists yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statics {
    #[serde(default)]
    pub schema_page_content: Map<String, Value>,

    #[serde(default)]
    pub action_page_content: Map<String, Value>,
}
