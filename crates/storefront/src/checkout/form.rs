use std::fmt;

use harbor_core::{AddressId, Email, Phone};
use serde::{Deserialize, Serialize};

use super::{CheckoutFormError, PlaceOrderBlocker};
use crate::api::{
    Address, Checkout, CheckoutUpdate, Location, PaymentMethod, ShippingAddressInput, ShippingRate,
};

/// Editable checkout form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    Email,
    FirstName,
    LastName,
    Phone,
    Address1,
    Province,
    District,
    Ward,
    Note,
}

impl CheckoutField {
    /// Fields copied from a saved address.
    #[must_use]
    pub const fn is_address_field(self) -> bool {
        !matches!(self, Self::Email | Self::Note)
    }

    #[must_use]
    pub const fn is_location(self) -> bool {
        matches!(self, Self::Province | Self::District | Self::Ward)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Phone => "phone",
            Self::Address1 => "address1",
            Self::Province => "province",
            Self::District => "district",
            Self::Ward => "ward",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New value for a field. Location fields take a region node (or `None` to
/// clear); every other field takes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Location(Option<Location>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<Location>> for FieldValue {
    fn from(value: Option<Location>) -> Self {
        Self::Location(value)
    }
}

impl From<Location> for FieldValue {
    fn from(value: Location) -> Self {
        Self::Location(Some(value))
    }
}

/// What an edit changed, and what the caller must do about it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// The form is no longer the saved address it was filled from.
    pub address_detached: bool,
    pub location_changed: bool,
    /// A complete location was (re)established; fetch rates for it.
    pub refresh_shipping_rates: bool,
    /// The location became incomplete; rates were dropped.
    pub clear_shipping_rates: bool,
}

impl EditOutcome {
    /// Whether the edit changed anything at all.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.address_detached
            && !self.location_changed
            && !self.refresh_shipping_rates
            && !self.clear_shipping_rates
    }
}

/// The visitor's checkout form.
///
/// Invariants kept by every method:
/// - `selected_address_id` is set only while every address field equals the
///   saved address it came from.
/// - `shipping_rate_id` is set only if that rate is in `shipping_rates`.
/// - `shipping_rates` is non-empty only while the location is complete.
/// - `rates_stale` is set from the moment a complete location is
///   (re)established until rates for it are set; stale rates never
///   satisfy the place-order check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
    address1: String,
    province: Option<Location>,
    district: Option<Location>,
    ward: Option<Location>,
    note: String,
    selected_address_id: Option<AddressId>,
    shipping_rates: Vec<ShippingRate>,
    shipping_rate_id: Option<String>,
    payment_method: Option<String>,
    #[serde(default)]
    rates_stale: bool,
    /// Set by every effective change, cleared once pushed to the API.
    #[serde(default)]
    dirty: bool,
}

impl CheckoutForm {
    /// Build the local mirror from the remote session.
    #[must_use]
    pub fn from_checkout(checkout: &Checkout) -> Self {
        let address = checkout.shipping_address.clone().unwrap_or_default();

        let mut form = Self {
            email: checkout.email.clone().unwrap_or_default(),
            first_name: address.first_name.unwrap_or_default(),
            last_name: address.last_name.unwrap_or_default(),
            phone: address.phone.unwrap_or_default(),
            address1: address.address1.unwrap_or_default(),
            province: address.province.and_then(normalize_location),
            district: address.district.and_then(normalize_location),
            ward: address.ward.and_then(normalize_location),
            note: checkout.note.clone().unwrap_or_default(),
            selected_address_id: checkout.address_id,
            shipping_rates: Vec::new(),
            shipping_rate_id: None,
            payment_method: checkout.payment_method.clone(),
            rates_stale: false,
            dirty: false,
        };

        if form.location_complete() {
            form.shipping_rates.clone_from(&checkout.shipping_rates);
            form.shipping_rate_id = checkout
                .shipping_rate_id
                .clone()
                .filter(|id| form.has_rate(id));
        }
        form
    }

    /// Apply one field edit.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutFormError::ValueMismatch` if a text value is given for
    /// a location field or a location for a text field.
    pub fn apply_edit(
        &mut self,
        field: CheckoutField,
        value: impl Into<FieldValue>,
    ) -> Result<EditOutcome, CheckoutFormError> {
        let value = value.into();
        let mut outcome = EditOutcome::default();

        let changed = match (field, value) {
            (CheckoutField::Province, FieldValue::Location(location)) => {
                let location = location.and_then(normalize_location);
                let changed = self.province != location;
                if changed {
                    self.province = location;
                    self.district = None;
                    self.ward = None;
                }
                changed
            }
            (CheckoutField::District, FieldValue::Location(location)) => {
                let location = location.and_then(normalize_location);
                let changed = self.district != location;
                if changed {
                    self.district = location;
                    self.ward = None;
                }
                changed
            }
            (CheckoutField::Ward, FieldValue::Location(location)) => {
                let location = location.and_then(normalize_location);
                let changed = self.ward != location;
                if changed {
                    self.ward = location;
                }
                changed
            }
            (field, FieldValue::Text(text)) => {
                let Some(slot) = self.text_slot(field) else {
                    return Err(CheckoutFormError::ValueMismatch(field));
                };
                let text = text.trim();
                let changed = slot.as_str() != text;
                if changed {
                    text.clone_into(slot);
                }
                changed
            }
            (field, FieldValue::Location(_)) => {
                return Err(CheckoutFormError::ValueMismatch(field));
            }
        };

        if !changed {
            return Ok(outcome);
        }
        self.dirty = true;

        if field.is_address_field() && self.selected_address_id.take().is_some() {
            outcome.address_detached = true;
        }

        if field.is_location() {
            outcome.location_changed = true;
            if self.location_complete() {
                self.rates_stale = true;
                outcome.refresh_shipping_rates = true;
            } else {
                self.clear_rates();
                outcome.clear_shipping_rates = true;
            }
        }

        Ok(outcome)
    }

    /// Fill the address fields from a saved address.
    pub fn select_address(&mut self, address: &Address) -> EditOutcome {
        let previous = self.location_key();

        address.first_name.trim().clone_into(&mut self.first_name);
        address.last_name.trim().clone_into(&mut self.last_name);
        address.phone.trim().clone_into(&mut self.phone);
        address.address1.trim().clone_into(&mut self.address1);
        self.province = normalize_location(address.province.clone());
        self.district = normalize_location(address.district.clone());
        self.ward = normalize_location(address.ward.clone());
        self.selected_address_id = Some(address.id);
        self.dirty = true;

        let mut outcome = EditOutcome {
            location_changed: previous != self.location_key(),
            ..EditOutcome::default()
        };

        if self.location_complete() {
            if outcome.location_changed {
                self.rates_stale = true;
            }
            outcome.refresh_shipping_rates = self.rates_stale || self.shipping_rates.is_empty();
        } else {
            self.clear_rates();
            outcome.clear_shipping_rates = true;
        }
        outcome
    }

    /// Replace the offered shipping rates.
    ///
    /// Keeps the selected rate if it is still offered, otherwise selects the
    /// first one. Ignored while the location is incomplete.
    pub fn set_shipping_rates(&mut self, rates: Vec<ShippingRate>) {
        if !self.location_complete() {
            self.clear_rates();
            return;
        }

        self.shipping_rates = rates;
        self.rates_stale = false;
        let keep = self
            .shipping_rate_id
            .as_deref()
            .is_some_and(|id| self.has_rate(id));
        if !keep {
            let first = self.shipping_rates.first().map(|rate| rate.id.clone());
            if first != self.shipping_rate_id {
                self.shipping_rate_id = first;
                self.dirty = true;
            }
        }
    }

    /// # Errors
    ///
    /// Returns `CheckoutFormError::UnknownShippingRate` if the id is not among
    /// the offered rates.
    pub fn select_shipping_rate(&mut self, id: &str) -> Result<(), CheckoutFormError> {
        if !self.has_rate(id) {
            return Err(CheckoutFormError::UnknownShippingRate(id.to_string()));
        }
        if self.shipping_rate_id.as_deref() != Some(id) {
            self.shipping_rate_id = Some(id.to_string());
            self.dirty = true;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the code is unknown or the method is disabled.
    pub fn select_payment_method(
        &mut self,
        code: &str,
        methods: &[PaymentMethod],
    ) -> Result<(), CheckoutFormError> {
        let method = methods
            .iter()
            .find(|method| method.code == code)
            .ok_or_else(|| CheckoutFormError::UnknownPaymentMethod(code.to_string()))?;
        if !method.enabled {
            return Err(CheckoutFormError::PaymentMethodDisabled(code.to_string()));
        }
        if self.payment_method.as_deref() != Some(code) {
            self.payment_method = Some(method.code.clone());
            self.dirty = true;
        }
        Ok(())
    }

    /// Province, district and ward are all present.
    #[must_use]
    pub const fn location_complete(&self) -> bool {
        self.province.is_some() && self.district.is_some() && self.ward.is_some()
    }

    /// Everything that keeps the order from being placed, in form order.
    #[must_use]
    pub fn place_order_blockers(&self, item_count: u32) -> Vec<PlaceOrderBlocker> {
        let mut blockers = Vec::new();
        if item_count == 0 {
            blockers.push(PlaceOrderBlocker::EmptyCart);
        }
        if !Email::is_valid(&self.email) {
            blockers.push(PlaceOrderBlocker::InvalidEmail);
        }
        if self.first_name.is_empty() || self.last_name.is_empty() {
            blockers.push(PlaceOrderBlocker::MissingName);
        }
        if !Phone::is_valid(&self.phone) {
            blockers.push(PlaceOrderBlocker::InvalidPhone);
        }
        if self.address1.is_empty() {
            blockers.push(PlaceOrderBlocker::MissingAddress);
        }
        if !self.location_complete() {
            blockers.push(PlaceOrderBlocker::IncompleteLocation);
        }
        if self.shipping_rate_id.is_none() || self.rates_stale {
            blockers.push(PlaceOrderBlocker::NoShippingRate);
        }
        if self.payment_method.is_none() {
            blockers.push(PlaceOrderBlocker::NoPaymentMethod);
        }
        blockers
    }

    #[must_use]
    pub fn can_place_order(&self, item_count: u32) -> bool {
        self.place_order_blockers(item_count).is_empty()
    }

    /// Request body for the remote session.
    #[must_use]
    pub fn to_update(&self) -> CheckoutUpdate {
        CheckoutUpdate {
            email: non_empty(&self.email),
            shipping_address: ShippingAddressInput {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                phone: self.phone.clone(),
                address1: self.address1.clone(),
                province_code: self.province.as_ref().map(|l| l.code.clone()),
                district_code: self.district.as_ref().map(|l| l.code.clone()),
                ward_code: self.ward.as_ref().map(|l| l.code.clone()),
            },
            address_id: self.selected_address_id,
            shipping_rate_id: self.shipping_rate_id.clone(),
            payment_method: self.payment_method.clone(),
            note: non_empty(&self.note),
        }
    }

    /// Whether local edits have not been pushed yet.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_synced(&mut self) {
        self.dirty = false;
    }

    /// Drop the offered rates and mark the whole form for pushing, for when
    /// the form moves to a new remote checkout.
    pub fn reset_shipping_rates(&mut self) {
        self.clear_rates();
        self.rates_stale = self.location_complete();
        self.dirty = true;
    }

    /// The location is complete but its rates have not been fetched yet.
    ///
    /// Stays set across requests until [`Self::set_shipping_rates`] succeeds,
    /// so a failed refresh is retried on the next push.
    #[must_use]
    pub const fn needs_shipping_rates(&self) -> bool {
        self.location_complete() && self.rates_stale
    }

    // Accessors

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn address1(&self) -> &str {
        &self.address1
    }

    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    #[must_use]
    pub const fn province(&self) -> Option<&Location> {
        self.province.as_ref()
    }

    #[must_use]
    pub const fn district(&self) -> Option<&Location> {
        self.district.as_ref()
    }

    #[must_use]
    pub const fn ward(&self) -> Option<&Location> {
        self.ward.as_ref()
    }

    #[must_use]
    pub const fn selected_address_id(&self) -> Option<AddressId> {
        self.selected_address_id
    }

    #[must_use]
    pub fn shipping_rates(&self) -> &[ShippingRate] {
        &self.shipping_rates
    }

    #[must_use]
    pub fn shipping_rate_id(&self) -> Option<&str> {
        self.shipping_rate_id.as_deref()
    }

    #[must_use]
    pub fn selected_shipping_rate(&self) -> Option<&ShippingRate> {
        let id = self.shipping_rate_id.as_deref()?;
        self.shipping_rates.iter().find(|rate| rate.id == id)
    }

    #[must_use]
    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    const fn text_slot(&mut self, field: CheckoutField) -> Option<&mut String> {
        match field {
            CheckoutField::Email => Some(&mut self.email),
            CheckoutField::FirstName => Some(&mut self.first_name),
            CheckoutField::LastName => Some(&mut self.last_name),
            CheckoutField::Phone => Some(&mut self.phone),
            CheckoutField::Address1 => Some(&mut self.address1),
            CheckoutField::Note => Some(&mut self.note),
            CheckoutField::Province | CheckoutField::District | CheckoutField::Ward => None,
        }
    }

    fn has_rate(&self, id: &str) -> bool {
        self.shipping_rates.iter().any(|rate| rate.id == id)
    }

    fn clear_rates(&mut self) {
        self.shipping_rates.clear();
        self.shipping_rate_id = None;
        self.rates_stale = false;
    }

    fn location_key(&self) -> [Option<String>; 3] {
        [&self.province, &self.district, &self.ward]
            .map(|location| location.as_ref().map(|l| l.code.clone()))
    }
}

/// Trim a location, dropping it when the code is empty.
fn normalize_location(location: Location) -> Option<Location> {
    let code = location.code.trim();
    if code.is_empty() {
        return None;
    }
    Some(Location {
        code: code.to_string(),
        name: location.name.trim().to_string(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn loc(code: &str) -> Location {
        Location {
            code: code.to_string(),
            name: format!("Name {code}"),
        }
    }

    fn rate(id: &str, price: i64) -> ShippingRate {
        ShippingRate {
            id: id.to_string(),
            title: format!("Rate {id}"),
            price: Decimal::from(price),
            delivery_estimate: None,
        }
    }

    fn saved_address() -> Address {
        Address {
            id: AddressId::new(7),
            first_name: "Lan".to_string(),
            last_name: "Nguyen".to_string(),
            phone: "0912 345 678".to_string(),
            address1: "12 Hang Bac".to_string(),
            address2: None,
            province: loc("01"),
            district: loc("001"),
            ward: loc("00001"),
            is_default: true,
        }
    }

    fn complete_form() -> CheckoutForm {
        let mut form = CheckoutForm::default();
        form.apply_edit(CheckoutField::Email, "lan@example.vn").unwrap();
        form.apply_edit(CheckoutField::FirstName, "Lan").unwrap();
        form.apply_edit(CheckoutField::LastName, "Nguyen").unwrap();
        form.apply_edit(CheckoutField::Phone, "0912345678").unwrap();
        form.apply_edit(CheckoutField::Address1, "12 Hang Bac").unwrap();
        form.apply_edit(CheckoutField::Province, loc("01")).unwrap();
        form.apply_edit(CheckoutField::District, loc("001")).unwrap();
        form.apply_edit(CheckoutField::Ward, loc("00001")).unwrap();
        form.set_shipping_rates(vec![rate("standard", 30_000), rate("express", 60_000)]);
        form.payment_method = Some("cod".to_string());
        form
    }

    #[test]
    fn test_unchanged_value_is_noop() {
        let mut form = CheckoutForm::default();
        form.apply_edit(CheckoutField::Email, "a@b.vn").unwrap();
        form.mark_synced();

        let outcome = form.apply_edit(CheckoutField::Email, "  a@b.vn  ").unwrap();
        assert!(outcome.is_noop());
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_text_values_are_trimmed() {
        let mut form = CheckoutForm::default();
        form.apply_edit(CheckoutField::Address1, "  5 Ly Thai To ").unwrap();
        assert_eq!(form.address1(), "5 Ly Thai To");
        assert!(form.is_dirty());
    }

    #[test]
    fn test_value_mismatch_is_rejected() {
        let mut form = CheckoutForm::default();
        let err = form.apply_edit(CheckoutField::Province, "01").unwrap_err();
        assert_eq!(err, CheckoutFormError::ValueMismatch(CheckoutField::Province));

        let err = form.apply_edit(CheckoutField::Email, loc("01")).unwrap_err();
        assert_eq!(err, CheckoutFormError::ValueMismatch(CheckoutField::Email));
    }

    #[test]
    fn test_province_change_clears_district_and_ward() {
        let mut form = complete_form();
        let outcome = form.apply_edit(CheckoutField::Province, loc("79")).unwrap();

        assert_eq!(form.province().unwrap().code, "79");
        assert!(form.district().is_none());
        assert!(form.ward().is_none());
        assert!(outcome.location_changed);
        assert!(outcome.clear_shipping_rates);
        assert!(!outcome.refresh_shipping_rates);
        assert!(form.shipping_rates().is_empty());
        assert!(form.shipping_rate_id().is_none());
    }

    #[test]
    fn test_district_change_clears_only_ward() {
        let mut form = complete_form();
        form.apply_edit(CheckoutField::District, loc("002")).unwrap();

        assert_eq!(form.province().unwrap().code, "01");
        assert_eq!(form.district().unwrap().code, "002");
        assert!(form.ward().is_none());
    }

    #[test]
    fn test_completing_location_requests_rates() {
        let mut form = CheckoutForm::default();
        let outcome = form.apply_edit(CheckoutField::Province, loc("01")).unwrap();
        assert!(!outcome.refresh_shipping_rates);
        let outcome = form.apply_edit(CheckoutField::District, loc("001")).unwrap();
        assert!(!outcome.refresh_shipping_rates);
        let outcome = form.apply_edit(CheckoutField::Ward, loc("00001")).unwrap();
        assert!(outcome.refresh_shipping_rates);
        assert!(!outcome.clear_shipping_rates);
        assert!(form.location_complete());
    }

    #[test]
    fn test_changing_ward_requests_rates_again() {
        let mut form = complete_form();
        let outcome = form.apply_edit(CheckoutField::Ward, loc("00004")).unwrap();
        assert!(outcome.refresh_shipping_rates);
        // Rates stay until the refresh replaces them, but cannot be ordered with.
        assert_eq!(form.shipping_rates().len(), 2);
        assert!(form.needs_shipping_rates());
        assert!(!form.can_place_order(1));
    }

    #[test]
    fn test_failed_rate_refresh_is_retried_later() {
        let mut form = complete_form();
        form.apply_edit(CheckoutField::Ward, loc("00004")).unwrap();

        // The refresh never happened; the form went back to the session as is.
        let mut form: CheckoutForm =
            serde_json::from_value(serde_json::to_value(&form).unwrap()).unwrap();
        let outcome = form.apply_edit(CheckoutField::Note, "Ring twice").unwrap();
        assert!(!outcome.refresh_shipping_rates);
        assert!(form.needs_shipping_rates());
        assert!(
            form.place_order_blockers(1)
                .contains(&PlaceOrderBlocker::NoShippingRate)
        );

        form.set_shipping_rates(vec![rate("hcm-std", 35_000)]);
        assert!(!form.needs_shipping_rates());
        assert_eq!(form.shipping_rate_id(), Some("hcm-std"));
        assert!(form.can_place_order(1));
    }

    #[test]
    fn test_reset_on_new_checkout_requests_rates() {
        let mut form = complete_form();
        form.reset_shipping_rates();
        assert!(form.shipping_rates().is_empty());
        assert!(form.needs_shipping_rates());
    }

    #[test]
    fn test_text_edit_does_not_request_rates() {
        let mut form = complete_form();
        let outcome = form.apply_edit(CheckoutField::Phone, "0987654321").unwrap();
        assert!(!outcome.refresh_shipping_rates);
        assert!(!outcome.location_changed);
    }

    #[test]
    fn test_clearing_ward_drops_rates() {
        let mut form = complete_form();
        let outcome = form.apply_edit(CheckoutField::Ward, None::<Location>).unwrap();
        assert!(outcome.clear_shipping_rates);
        assert!(form.shipping_rates().is_empty());
    }

    #[test]
    fn test_empty_location_code_counts_as_none() {
        let mut form = CheckoutForm::default();
        let outcome = form
            .apply_edit(
                CheckoutField::Province,
                Location {
                    code: "  ".to_string(),
                    name: String::new(),
                },
            )
            .unwrap();
        assert!(outcome.is_noop());
        assert!(form.province().is_none());
    }

    #[test]
    fn test_select_address_copies_fields_and_requests_rates() {
        let mut form = CheckoutForm::default();
        let outcome = form.select_address(&saved_address());

        assert_eq!(form.selected_address_id(), Some(AddressId::new(7)));
        assert_eq!(form.first_name(), "Lan");
        assert_eq!(form.ward().unwrap().code, "00001");
        assert!(outcome.location_changed);
        assert!(outcome.refresh_shipping_rates);
        assert!(!outcome.address_detached);
    }

    #[test]
    fn test_select_same_location_with_rates_skips_refresh() {
        let mut form = complete_form();
        let outcome = form.select_address(&saved_address());
        assert!(!outcome.location_changed);
        assert!(!outcome.refresh_shipping_rates);
        assert_eq!(form.shipping_rate_id(), Some("standard"));
    }

    #[test]
    fn test_editing_address_field_detaches_saved_address() {
        let mut form = CheckoutForm::default();
        let address = saved_address();
        form.select_address(&address);

        let outcome = form.apply_edit(CheckoutField::Address1, "99 Hang Gai").unwrap();
        assert!(outcome.address_detached);
        assert!(form.selected_address_id().is_none());
        // The saved address is untouched.
        assert_eq!(address.address1, "12 Hang Bac");
    }

    #[test]
    fn test_same_value_keeps_saved_address() {
        let mut form = CheckoutForm::default();
        form.select_address(&saved_address());

        let outcome = form.apply_edit(CheckoutField::FirstName, "Lan").unwrap();
        assert!(!outcome.address_detached);
        assert_eq!(form.selected_address_id(), Some(AddressId::new(7)));
    }

    #[test]
    fn test_email_and_note_never_detach() {
        let mut form = CheckoutForm::default();
        form.select_address(&saved_address());

        form.apply_edit(CheckoutField::Email, "new@example.vn").unwrap();
        form.apply_edit(CheckoutField::Note, "Leave at the door").unwrap();
        assert_eq!(form.selected_address_id(), Some(AddressId::new(7)));
    }

    #[test]
    fn test_set_shipping_rates_keeps_selected_when_still_offered() {
        let mut form = complete_form();
        form.select_shipping_rate("express").unwrap();

        form.set_shipping_rates(vec![rate("standard", 25_000), rate("express", 55_000)]);
        assert_eq!(form.shipping_rate_id(), Some("express"));
    }

    #[test]
    fn test_set_shipping_rates_falls_back_to_first() {
        let mut form = complete_form();
        form.select_shipping_rate("express").unwrap();

        form.set_shipping_rates(vec![rate("economy", 15_000), rate("standard", 25_000)]);
        assert_eq!(form.shipping_rate_id(), Some("economy"));

        form.set_shipping_rates(Vec::new());
        assert!(form.shipping_rate_id().is_none());
    }

    #[test]
    fn test_set_shipping_rates_ignored_without_location() {
        let mut form = CheckoutForm::default();
        form.set_shipping_rates(vec![rate("standard", 25_000)]);
        assert!(form.shipping_rates().is_empty());
        assert!(form.shipping_rate_id().is_none());
    }

    #[test]
    fn test_select_unknown_shipping_rate() {
        let mut form = complete_form();
        let err = form.select_shipping_rate("drone").unwrap_err();
        assert_eq!(err, CheckoutFormError::UnknownShippingRate("drone".to_string()));
        assert_eq!(form.shipping_rate_id(), Some("standard"));
    }

    #[test]
    fn test_select_payment_method_requires_enabled() {
        let methods = vec![
            PaymentMethod {
                code: "cod".to_string(),
                name: "Cash on delivery".to_string(),
                description: None,
                enabled: true,
            },
            PaymentMethod {
                code: "card".to_string(),
                name: "Card".to_string(),
                description: None,
                enabled: false,
            },
        ];
        let mut form = CheckoutForm::default();

        assert_eq!(
            form.select_payment_method("card", &methods).unwrap_err(),
            CheckoutFormError::PaymentMethodDisabled("card".to_string())
        );
        assert_eq!(
            form.select_payment_method("crypto", &methods).unwrap_err(),
            CheckoutFormError::UnknownPaymentMethod("crypto".to_string())
        );
        form.select_payment_method("cod", &methods).unwrap();
        assert_eq!(form.payment_method(), Some("cod"));
    }

    #[test]
    fn test_place_order_blockers() {
        let form = CheckoutForm::default();
        let blockers = form.place_order_blockers(0);
        assert_eq!(
            blockers,
            vec![
                PlaceOrderBlocker::EmptyCart,
                PlaceOrderBlocker::InvalidEmail,
                PlaceOrderBlocker::MissingName,
                PlaceOrderBlocker::InvalidPhone,
                PlaceOrderBlocker::MissingAddress,
                PlaceOrderBlocker::IncompleteLocation,
                PlaceOrderBlocker::NoShippingRate,
                PlaceOrderBlocker::NoPaymentMethod,
            ]
        );

        let form = complete_form();
        assert!(form.can_place_order(2));
        assert_eq!(form.place_order_blockers(0), vec![PlaceOrderBlocker::EmptyCart]);
    }

    #[test]
    fn test_invalid_phone_blocks_order() {
        let mut form = complete_form();
        form.apply_edit(CheckoutField::Phone, "12ab").unwrap();
        assert_eq!(
            form.place_order_blockers(1),
            vec![PlaceOrderBlocker::InvalidPhone]
        );
    }

    #[test]
    fn test_to_update_serializes_nulls() {
        let form = CheckoutForm::default();
        let json = serde_json::to_value(form.to_update()).unwrap();
        assert!(json["email"].is_null());
        assert!(json["shipping_rate_id"].is_null());
        assert!(json["shipping_address"]["province_code"].is_null());

        let form = complete_form();
        let update = form.to_update();
        assert_eq!(update.email.as_deref(), Some("lan@example.vn"));
        assert_eq!(update.shipping_address.ward_code.as_deref(), Some("00001"));
        assert_eq!(update.shipping_rate_id.as_deref(), Some("standard"));
    }

    #[test]
    fn test_from_checkout_drops_rates_for_incomplete_location() {
        let json = r#"{
            "token": "chk_1",
            "email": "lan@example.vn",
            "shipping_address": {"province": {"code": "01", "name": "Ha Noi"}},
            "shipping_rates": [{"id": "standard", "title": "Standard", "price": "30000"}],
            "shipping_rate_id": "standard",
            "subtotal": "100000",
            "total": "100000"
        }"#;
        let checkout: Checkout = serde_json::from_str(json).unwrap();
        let form = CheckoutForm::from_checkout(&checkout);

        assert_eq!(form.email(), "lan@example.vn");
        assert!(form.shipping_rates().is_empty());
        assert!(form.shipping_rate_id().is_none());
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_from_checkout_drops_unknown_selected_rate() {
        let json = r#"{
            "token": "chk_1",
            "shipping_address": {
                "province": {"code": "01", "name": "Ha Noi"},
                "district": {"code": "001", "name": "Ba Dinh"},
                "ward": {"code": "00001", "name": "Phuc Xa"}
            },
            "shipping_rates": [{"id": "standard", "title": "Standard", "price": "30000"}],
            "shipping_rate_id": "express",
            "subtotal": "100000",
            "total": "130000"
        }"#;
        let checkout: Checkout = serde_json::from_str(json).unwrap();
        let form = CheckoutForm::from_checkout(&checkout);

        assert_eq!(form.shipping_rates().len(), 1);
        assert!(form.shipping_rate_id().is_none());
    }

    #[test]
    fn test_selection_changes_mark_dirty() {
        let mut form = complete_form();
        form.mark_synced();

        form.select_shipping_rate("standard").unwrap();
        assert!(!form.is_dirty());

        form.select_shipping_rate("express").unwrap();
        assert!(form.is_dirty());
        form.mark_synced();

        form.set_shipping_rates(vec![rate("express", 55_000)]);
        assert!(!form.is_dirty());

        form.set_shipping_rates(vec![rate("economy", 20_000)]);
        assert_eq!(form.shipping_rate_id(), Some("economy"));
        assert!(form.is_dirty());
    }

    #[test]
    fn test_reset_shipping_rates() {
        let mut form = complete_form();
        form.mark_synced();
        form.reset_shipping_rates();

        assert!(form.shipping_rates().is_empty());
        assert!(form.shipping_rate_id().is_none());
        assert!(form.is_dirty());
        assert!(form.location_complete());
    }
}
