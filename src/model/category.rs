use serde::{Deserialize, Serialize};

/// The fixed set of expense categories. The serialized names are the ones shown to the user and
/// stored in the data file.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Groceries,
    Medicine,
    Clothes,
    Insurance,
    #[serde(rename = "Vehicle Expenses")]
    VehicleExpenses,
    #[serde(rename = "Housing Maintenance")]
    HousingMaintenance,
    Others,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in the order they are presented.
    pub const ALL: [Category; 7] = [
        Category::Groceries,
        Category::Medicine,
        Category::Clothes,
        Category::Insurance,
        Category::VehicleExpenses,
        Category::HousingMaintenance,
        Category::Others,
    ];

    /// A comma separated list of the valid names, for error messages.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
