//! Typed partial edit of a shop's public fields.
//!
//! An update request stores only the fields the requester actually changed.
//! Approval applies exactly those fields and leaves the rest of the shop alone.

use serde::{Deserialize, Serialize};

/// The editable public fields of a shop, as currently stored or as submitted
/// in an edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopFields {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub schedule: String,
    pub whatsapp: bool,
}

/// Changed fields only; `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShopPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<bool>,
}

fn changed<T: PartialEq + Clone>(current: &T, proposed: &T) -> Option<T> {
    (current != proposed).then(|| proposed.clone())
}

impl ShopPatch {
    /// Build the patch that turns `current` into `proposed`.
    #[must_use]
    pub fn diff(current: &ShopFields, proposed: &ShopFields) -> Self {
        Self {
            name: changed(&current.name, &proposed.name),
            phone: changed(&current.phone, &proposed.phone),
            address: changed(&current.address, &proposed.address),
            city: changed(&current.city, &proposed.city),
            schedule: changed(&current.schedule, &proposed.schedule),
            whatsapp: changed(&current.whatsapp, &proposed.whatsapp),
        }
    }

    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.schedule.is_none()
            && self.whatsapp.is_none()
    }

    /// Names of the fields present, in declaration order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("phone", self.phone.is_some()),
            ("address", self.address.is_some()),
            ("city", self.city.is_some()),
            ("schedule", self.schedule.is_some()),
            ("whatsapp", self.whatsapp.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn taller_central() -> ShopFields {
        ShopFields {
            name: "Taller Central".to_string(),
            phone: "809-555-0101".to_string(),
            address: "Av. Duarte 12".to_string(),
            city: "Santo Domingo".to_string(),
            schedule: "Lun-Sab 8:00-18:00".to_string(),
            whatsapp: false,
        }
    }

    #[test]
    fn test_diff_of_identical_forms_is_empty() {
        let shop = taller_central();
        let patch = ShopPatch::diff(&shop, &shop.clone());
        assert!(patch.is_empty());
        assert!(patch.changed_fields().is_empty());
    }

    #[test]
    fn test_diff_keeps_only_changed_fields() {
        let current = taller_central();
        let mut proposed = current.clone();
        proposed.city = "Santiago".to_string();
        proposed.whatsapp = true;

        let patch = ShopPatch::diff(&current, &proposed);
        assert_eq!(patch.city.as_deref(), Some("Santiago"));
        assert_eq!(patch.whatsapp, Some(true));
        assert_eq!(patch.name, None);
        assert_eq!(patch.changed_fields(), vec!["city", "whatsapp"]);
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let patch = ShopPatch {
            city: Some("Santiago".to_string()),
            ..ShopPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "city": "Santiago" })
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = serde_json::from_str::<ShopPatch>(r#"{"rating": 5}"#);
        assert!(result.is_err());
    }
}
