use crate::api::types::{BuildingDirectory, Category};
use crate::api::{ApiRequest, Origin, RequestSink, Sequencer, Ticket};
use crate::error::Result;
use crate::output::OutputRegion;

pub const MAIN_GROUP_LABEL: &str = "(Main Buildings)";
pub const OTHERS_GROUP_LABEL: &str = "(Others)";

/// A labelled run of options; `label` is `None` for ungrouped options.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub label: Option<String>,
    pub options: Vec<String>,
}

/// A building selector: a placeholder entry followed by option groups.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectWidget {
    placeholder: String,
    groups: Vec<OptionGroup>,
    /// Empty while the placeholder is selected.
    selected: String,
}

impl SelectWidget {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            groups: Vec::new(),
            selected: String::new(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    /// Add groups after whatever is already there.
    pub fn append(&mut self, groups: &[OptionGroup]) {
        self.groups.extend_from_slice(groups);
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.options.iter().map(String::as_str))
    }

    pub fn value(&self) -> &str {
        &self.selected
    }

    /// Select an option by value; an empty value selects the placeholder.
    /// Unknown values are ignored.
    pub fn select(&mut self, value: &str) -> bool {
        if value.is_empty() || self.options().any(|o| o == value) {
            self.selected = value.to_string();
            true
        } else {
            false
        }
    }
}

/// Option groups for a directory, in backend order.
pub fn option_groups(directory: &BuildingDirectory) -> Vec<OptionGroup> {
    let names = |category| {
        directory
            .in_category(category)
            .map(|b| b.name.clone())
            .collect::<Vec<_>>()
    };
    if directory.grouped {
        vec![
            OptionGroup {
                label: Some(MAIN_GROUP_LABEL.to_string()),
                options: names(Category::Main),
            },
            OptionGroup {
                label: Some(OTHERS_GROUP_LABEL.to_string()),
                options: names(Category::Other),
            },
        ]
    } else {
        vec![OptionGroup {
            label: None,
            options: directory.buildings.iter().map(|b| b.name.clone()).collect(),
        }]
    }
}

/// Loads the building list into the source and destination selectors.
#[derive(Debug)]
pub struct BuildingCatalog {
    pub source: SelectWidget,
    pub destination: SelectWidget,
    directory: Option<BuildingDirectory>,
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildingCatalog {
    pub fn new() -> Self {
        Self {
            source: SelectWidget::new("Select starting point"),
            destination: SelectWidget::new("Select destination"),
            directory: None,
        }
    }

    pub fn directory(&self) -> Option<&BuildingDirectory> {
        self.directory.as_ref()
    }

    pub fn load_buildings(
        &mut self,
        sequencer: &mut Sequencer,
        sink: &mut dyn RequestSink,
    ) -> Ticket {
        let ticket = sequencer.ticket(Origin::Catalog);
        sink.submit(ticket, ApiRequest::Buildings);
        ticket
    }

    /// Populate both selectors, or report the failure. Never retries.
    pub fn on_loaded(&mut self, result: Result<BuildingDirectory>, output: &mut OutputRegion) {
        match result {
            Ok(directory) => {
                let groups = option_groups(&directory);
                self.source.append(&groups);
                self.destination.append(&groups);
                tracing::info!("loaded {} buildings", directory.len());
                self.directory = Some(directory);
            }
            Err(e) => {
                tracing::error!("Error loading buildings: {e}");
                output.error(format!("Error loading buildings: {e}"));
            }
        }
    }
}
