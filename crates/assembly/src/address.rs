use foundation::ids::AddressId;
use streaming::protocol::{Address, NewAddress, address_match_key};

/// The project's addresses as the engine sees them, including optimistic
/// inserts awaiting confirmation.
#[derive(Debug, Clone, Default)]
pub struct AddressList {
    addresses: Vec<Address>,
    next_pending: u64,
}

impl AddressList {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self {
            addresses,
            next_pending: 0,
        }
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// Case-insensitive, whitespace-trimmed comparison on the full address.
    pub fn contains_full_address(&self, full_address: &str) -> bool {
        let key = address_match_key(full_address);
        self.addresses.iter().any(|a| a.match_key() == key)
    }

    /// Replace the list wholesale, keeping the pending-id counter.
    pub fn replace(&mut self, addresses: Vec<Address>) {
        self.addresses = addresses;
    }

    pub fn insert_pending(&mut self, address: &NewAddress) -> AddressId {
        self.next_pending += 1;
        let id = AddressId::pending(self.next_pending);
        self.addresses.push(address.to_pending_address(id.clone()));
        id
    }

    /// Swap a pending entry for its confirmed record, in place.
    ///
    /// A confirmed record without a boundary keeps the pending entry's one.
    pub fn confirm(&mut self, pending: &AddressId, mut confirmed: Address) -> bool {
        match self.addresses.iter_mut().find(|a| &a.id == pending) {
            Some(slot) => {
                if !confirmed.has_cached_boundary() {
                    confirmed.boundary = slot.boundary.take();
                }
                *slot = confirmed;
                true
            }
            None => false,
        }
    }

    /// Remove exactly one entry by id.
    pub fn remove(&mut self, id: &AddressId) -> bool {
        match self.addresses.iter().position(|a| &a.id == id) {
            Some(i) => {
                self.addresses.remove(i);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AddressList;
    use foundation::ids::AddressId;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streaming::protocol::{Address, NewAddress};

    fn new_address(street: &str) -> NewAddress {
        NewAddress {
            street: street.to_string(),
            city: "Trenton".to_string(),
            state: "NJ".to_string(),
            zip_code: "08608".to_string(),
            full_address: format!("{street}, Trenton, NJ 08608"),
            latitude: None,
            longitude: None,
            boundary: json!(null),
        }
    }

    #[test]
    fn duplicate_detection_ignores_case_and_padding() {
        let list = AddressList::new(vec![Address::new(
            AddressId::new("1"),
            "1 Main St, Trenton, NJ 08608",
        )]);
        assert!(list.contains_full_address("  1 MAIN ST, trenton, nj 08608"));
        assert!(!list.contains_full_address("2 Main St, Trenton, NJ 08608"));
    }

    #[test]
    fn pending_entries_confirm_in_place_and_roll_back_alone() {
        let mut list = AddressList::new(vec![Address::new(AddressId::new("1"), "x")]);
        let a = list.insert_pending(&new_address("2 A St"));
        let b = list.insert_pending(&new_address("3 B St"));
        assert_ne!(a, b);
        assert!(a.is_pending() && b.is_pending());

        let confirmed = Address::new(AddressId::new("42"), "2 A St, Trenton, NJ 08608");
        assert!(list.confirm(&a, confirmed));
        assert!(list.remove(&b));

        let ids: Vec<&str> = list.as_slice().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "42"]);
        assert!(!list.remove(&b));
    }

    #[test]
    fn confirm_keeps_the_clicked_boundary() {
        let mut list = AddressList::default();
        let mut clicked = new_address("2 A St");
        clicked.boundary = json!({"wkt": "POLYGON ((0 0, 1 0, 1 1, 0 0))"});
        let pending = list.insert_pending(&clicked);

        let confirmed = Address::new(AddressId::new("42"), "2 A St, Trenton, NJ 08608");
        assert!(list.confirm(&pending, confirmed));

        let stored = list.get(&AddressId::new("42")).expect("confirmed");
        assert!(stored.has_cached_boundary());
        assert_eq!(stored.boundary, Some(clicked.boundary));
    }
}
