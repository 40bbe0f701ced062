use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_number: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub landmark: Option<String>,
    pub zipcode: String,
}

impl Address {
    /// One-line form used in address pickers
    pub fn display(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            self.name, self.street, self.city, self.state, self.zipcode
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub name: String,
    pub contact_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub zipcode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let json = r#"{"id":"a1","name":"Home","contactNumber":"9999999999","street":"1 Main St","city":"Pune","state":"MH","zipcode":"411001"}"#;
        let address: Address = serde_json::from_str(json).unwrap();
        assert_eq!(address.display(), "Home, 1 Main St, Pune, MH, 411001");
        assert_eq!(address.landmark, None);
    }

    #[test]
    fn test_new_address_wire_format() {
        let address = NewAddress {
            name: "Home".into(),
            contact_number: "9999999999".into(),
            street: "1 Main St".into(),
            city: "Pune".into(),
            state: "MH".into(),
            landmark: None,
            zipcode: "411001".into(),
        };
        let value = serde_json::to_value(&address).unwrap();
        assert_eq!(value["contactNumber"], "9999999999");
        assert!(value.get("landmark").is_none());
    }
}
