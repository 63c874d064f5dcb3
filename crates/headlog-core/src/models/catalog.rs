use serde::{Deserialize, Serialize};

/// A named entry in one of the user's catalogs (foods, drinks, remedies)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
}

pub type Food = CatalogItem;
pub type Drink = CatalogItem;
pub type Remedy = CatalogItem;

/// Which catalog an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Foods,
    Drinks,
    Remedies,
}

impl CatalogKind {
    pub fn title(&self) -> &'static str {
        match self {
            CatalogKind::Foods => "Foods",
            CatalogKind::Drinks => "Drinks",
            CatalogKind::Remedies => "Remedies",
        }
    }
}

/// Body for creating a catalog entry
#[derive(Debug, Serialize)]
pub(crate) struct NewCatalogItem<'a> {
    pub name: &'a str,
}

/// Foods and drinks consumed around a headache, by catalog id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    pub foods: Vec<String>,
    pub drinks: Vec<String>,
}

impl Consumption {
    /// Add `id` if absent, remove it if present
    pub fn toggle_food(&mut self, id: &str) {
        toggle(&mut self.foods, id);
    }

    pub fn toggle_drink(&mut self, id: &str) {
        toggle(&mut self.drinks, id);
    }
}

fn toggle(ids: &mut Vec<String>, id: &str) {
    if let Some(pos) = ids.iter().position(|existing| existing == id) {
        ids.remove(pos);
    } else {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumption_toggle() {
        let mut consumption = Consumption::default();
        consumption.toggle_food("f1");
        consumption.toggle_food("f2");
        consumption.toggle_food("f1");
        consumption.toggle_drink("d1");

        assert_eq!(consumption.foods, vec!["f2"]);
        assert_eq!(consumption.drinks, vec!["d1"]);
    }

    #[test]
    fn test_consumption_wire_format() {
        let consumption = Consumption {
            foods: vec!["f1".into()],
            drinks: vec![],
        };
        assert_eq!(
            serde_json::to_string(&consumption).unwrap(),
            r#"{"foods":["f1"],"drinks":[]}"#
        );
    }
}
