//! The ordered registry of every flag the program knows about.

use crate::FlagDescriptor;

/// Output format used by `list` when `--output` is not given.
pub const DEFAULT_OUTPUT_FORMAT: &str = "table";

/// Ordered collection of [`FlagDescriptor`]s.
///
/// Built once at startup and handed to the binder by reference. Registry
/// order is the order flags attach to a command.
///
/// # Examples
///
/// ```
/// use redhawk_flags::{FlagDescriptor, FlagRegistry};
///
/// let registry = FlagRegistry::new()
///     .with(FlagDescriptor::string("region", "").defined_on(["list"]))
///     .with(FlagDescriptor::boolean("dry-run", false).defined_on(["apply"]));
///
/// let names: Vec<_> = registry.for_command("list").map(|d| d.name()).collect();
/// assert_eq!(names, vec!["region"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    descriptors: Vec<FlagDescriptor>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flags of the `redhawk` command line.
    ///
    /// # Examples
    ///
    /// ```
    /// use redhawk_flags::FlagRegistry;
    ///
    /// let registry = FlagRegistry::redhawk();
    /// assert_eq!(registry.len(), 6);
    /// assert_eq!(registry.get("all").unwrap().shorthand(), Some('A'));
    /// ```
    pub fn redhawk() -> Self {
        Self::new()
            .with(
                FlagDescriptor::string("region", "")
                    .with_shorthand('r')
                    .with_usage("Run command to specific region")
                    .defined_on(["list"]),
            )
            .with(
                FlagDescriptor::string("config", "")
                    .with_usage("configuration file path for scanning resources")
                    .defined_on(["list"]),
            )
            .with(
                FlagDescriptor::boolean("detail", false)
                    .with_usage("detailed options for scanning")
                    .defined_on(["list"]),
            )
            .with(
                FlagDescriptor::boolean("all", false)
                    .with_shorthand('A')
                    .with_usage("Apply all regions of provider for command")
                    .defined_on(["list"]),
            )
            .with(
                FlagDescriptor::string("resources", "")
                    .with_usage(
                        "[Required]Resource list of provider for dynamic search(Delimiter: comma)",
                    )
                    .defined_on(["list"]),
            )
            .with(
                FlagDescriptor::string("output", DEFAULT_OUTPUT_FORMAT)
                    .with_shorthand('o')
                    .with_usage("Output format of scan results (table, json, yaml)")
                    .defined_on(["list"]),
            )
    }

    /// Appends a descriptor.
    pub fn push(&mut self, descriptor: FlagDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Appends a descriptor, builder style.
    pub fn with(mut self, descriptor: FlagDescriptor) -> Self {
        self.push(descriptor);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagDescriptor> {
        self.descriptors.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FlagDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Descriptors defined on `command`, in registry order.
    pub fn for_command<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a FlagDescriptor> {
        self.descriptors.iter().filter(move |d| d.applies_to(command))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a FlagRegistry {
    type Item = &'a FlagDescriptor;
    type IntoIter = std::slice::Iter<'a, FlagDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
