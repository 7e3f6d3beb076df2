//! Build variant descriptors, as supplied by the host build graph.

/// Parent directory, under the build directory, of every variant's resources.
pub const RESOURCES_OUTPUT_PATH: &str = "generated/gpp";

/// Leaf directory of a variant's publishing resources.
pub const PLAY_PATH: &str = "play";

/// Flavor name reported for variants without product flavors.
pub const DEFAULT_FLAVOR_NAME: &str = "main";

/// A concrete build output: one optional build type plus zero or more
/// `(dimension, flavor)` pairs, in dimension order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    build_type: Option<String>,
    product_flavors: Vec<(String, String)>,
}

impl Variant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build_type: None,
            product_flavors: Vec::new(),
        }
    }

    pub fn build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = Some(build_type.into());
        self
    }

    /// Append a `(dimension, flavor)` pair.
    pub fn flavor(mut self, dimension: impl Into<String>, flavor: impl Into<String>) -> Self {
        self.product_flavors.push((dimension.into(), flavor.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_type_name(&self) -> Option<&str> {
        self.build_type.as_deref()
    }

    pub fn product_flavors(&self) -> &[(String, String)] {
        &self.product_flavors
    }

    /// The combined flavor name: the first flavor verbatim, later flavors
    /// capitalized and appended (`free` + `staging` = `freeStaging`).
    pub fn flavor_name(&self) -> String {
        let mut name = String::new();
        for (i, (_, flavor)) in self.product_flavors.iter().enumerate() {
            if i == 0 {
                name.push_str(flavor);
            } else {
                name.push_str(&crate::task::capitalize(flavor));
            }
        }
        name
    }

    /// Like [`flavor_name`](Self::flavor_name), but `"main"` when empty.
    pub fn flavor_name_or_default(&self) -> String {
        let name = self.flavor_name();
        if name.is_empty() {
            DEFAULT_FLAVOR_NAME.to_string()
        } else {
            name
        }
    }

    /// Build-directory relative path of this variant's publishing resources.
    pub fn resources_path(&self) -> String {
        format!("{RESOURCES_OUTPUT_PATH}/{}/{PLAY_PATH}", self.name)
    }
}
