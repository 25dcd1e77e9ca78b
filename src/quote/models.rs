//! Quote draft data model.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Service identifiers offered in the quote wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleaningType {
    General,
    Deep,
    EndOfLease,
    Ndis,
    Commercial,
}

impl CleaningType {
    pub const ALL: [CleaningType; 5] = [
        CleaningType::General,
        CleaningType::Deep,
        CleaningType::EndOfLease,
        CleaningType::Ndis,
        CleaningType::Commercial,
    ];

    /// Catalog key
    pub fn key(self) -> &'static str {
        match self {
            CleaningType::General => "general",
            CleaningType::Deep => "deep",
            CleaningType::EndOfLease => "end-of-lease",
            CleaningType::Ndis => "ndis",
            CleaningType::Commercial => "commercial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CleaningType::General => "General Cleaning",
            CleaningType::Deep => "Deep Cleaning",
            CleaningType::EndOfLease => "End of Lease Cleaning",
            CleaningType::Ndis => "NDIS Cleaning",
            CleaningType::Commercial => "Commercial Cleaning",
        }
    }
}

/// Room types counted in the rooms step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomType {
    Bedrooms,
    Bathrooms,
    Kitchens,
    LivingRooms,
    DiningRooms,
}

impl RoomType {
    pub const ALL: [RoomType; 5] = [
        RoomType::Bedrooms,
        RoomType::Bathrooms,
        RoomType::Kitchens,
        RoomType::LivingRooms,
        RoomType::DiningRooms,
    ];

    /// Catalog key
    pub fn key(self) -> &'static str {
        match self {
            RoomType::Bedrooms => "bedrooms",
            RoomType::Bathrooms => "bathrooms",
            RoomType::Kitchens => "kitchens",
            RoomType::LivingRooms => "livingRooms",
            RoomType::DiningRooms => "diningRooms",
        }
    }
}

/// How soon the clean is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Standard,
    Urgent,
    SameDay,
}

impl Urgency {
    /// Catalog key
    pub fn key(self) -> &'static str {
        match self {
            Urgency::Standard => "standard",
            Urgency::Urgent => "urgent",
            Urgency::SameDay => "same-day",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub suburb: String,
    pub postcode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ndis_number: String,
    #[serde(rename = "isNDISParticipant")]
    pub is_ndis_participant: bool,
}

/// Customer text fields that can be edited individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    NdisNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    Suburb,
    Postcode,
}

/// Free-form scheduling and notes fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsField {
    SpecialRequests,
    PreferredDate,
    PreferredTime,
}

/// The in-progress quote configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteDraft {
    pub cleaning_type: Option<CleaningType>,
    pub rooms: BTreeMap<RoomType, u32>,
    pub extras: BTreeSet<String>,
    pub urgency: Option<Urgency>,
    pub location: Location,
    pub customer_info: CustomerInfo,
    pub special_requests: String,
    pub preferred_date: String,
    pub preferred_time: String,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            cleaning_type: None,
            rooms: RoomType::ALL.iter().map(|room| (*room, 0)).collect(),
            extras: BTreeSet::new(),
            urgency: Some(Urgency::Standard),
            location: Location::default(),
            customer_info: CustomerInfo::default(),
            special_requests: String::new(),
            preferred_date: String::new(),
            preferred_time: String::new(),
        }
    }
}

impl QuoteDraft {
    pub fn room_count(&self, room: RoomType) -> u32 {
        self.rooms.get(&room).copied().unwrap_or(0)
    }

    /// Sum of all room counts.
    pub fn total_rooms(&self) -> u64 {
        self.rooms.values().map(|count| u64::from(*count)).sum()
    }

    pub fn customer_field(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Name => &self.customer_info.name,
            CustomerField::Email => &self.customer_info.email,
            CustomerField::Phone => &self.customer_info.phone,
            CustomerField::NdisNumber => &self.customer_info.ndis_number,
        }
    }

    pub(crate) fn customer_field_mut(&mut self, field: CustomerField) -> &mut String {
        match field {
            CustomerField::Name => &mut self.customer_info.name,
            CustomerField::Email => &mut self.customer_info.email,
            CustomerField::Phone => &mut self.customer_info.phone,
            CustomerField::NdisNumber => &mut self.customer_info.ndis_number,
        }
    }

    pub(crate) fn location_field_mut(&mut self, field: LocationField) -> &mut String {
        match field {
            LocationField::Suburb => &mut self.location.suburb,
            LocationField::Postcode => &mut self.location.postcode,
        }
    }

    pub(crate) fn details_field_mut(&mut self, field: DetailsField) -> &mut String {
        match field {
            DetailsField::SpecialRequests => &mut self.special_requests,
            DetailsField::PreferredDate => &mut self.preferred_date,
            DetailsField::PreferredTime => &mut self.preferred_time,
        }
    }
}

/// Ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    ServiceSelection,
    RoomsAndExtras,
    ServiceDetails,
    ContactInfo,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::ServiceSelection,
        WizardStep::RoomsAndExtras,
        WizardStep::ServiceDetails,
        WizardStep::ContactInfo,
    ];

    /// 1-based position shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::ServiceSelection => 1,
            WizardStep::RoomsAndExtras => 2,
            WizardStep::ServiceDetails => 3,
            WizardStep::ContactInfo => 4,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::ServiceSelection => Some(WizardStep::RoomsAndExtras),
            WizardStep::RoomsAndExtras => Some(WizardStep::ServiceDetails),
            WizardStep::ServiceDetails => Some(WizardStep::ContactInfo),
            WizardStep::ContactInfo => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::ServiceSelection => None,
            WizardStep::RoomsAndExtras => Some(WizardStep::ServiceSelection),
            WizardStep::ServiceDetails => Some(WizardStep::RoomsAndExtras),
            WizardStep::ContactInfo => Some(WizardStep::ServiceDetails),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            WizardStep::ServiceSelection => "Service selection",
            WizardStep::RoomsAndExtras => "Rooms and extras",
            WizardStep::ServiceDetails => "Service details",
            WizardStep::ContactInfo => "Contact information",
        };
        write!(f, "{} (step {})", title, self.number())
    }
}

/// Booking form used by the dedicated NDIS enquiry page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NdisBookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ndis_number: String,
    pub address: String,
    pub suburb: String,
    pub postcode: String,
    pub plan_manager: String,
    pub support_needs: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_draft_has_every_room_at_zero() {
        let draft = QuoteDraft::default();
        assert_eq!(draft.rooms.len(), RoomType::ALL.len());
        assert_eq!(draft.total_rooms(), 0);
        assert_eq!(draft.urgency, Some(Urgency::Standard));
        assert!(draft.cleaning_type.is_none());
    }

    #[test]
    fn test_draft_json_field_names() {
        let mut draft = QuoteDraft::default();
        draft.cleaning_type = Some(CleaningType::EndOfLease);
        draft.urgency = Some(Urgency::SameDay);
        draft.rooms.insert(RoomType::LivingRooms, 2);
        draft.customer_info.is_ndis_participant = true;

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["cleaningType"], json!("end-of-lease"));
        assert_eq!(value["urgency"], json!("same-day"));
        assert_eq!(value["rooms"]["livingRooms"], json!(2));
        assert_eq!(value["customerInfo"]["isNDISParticipant"], json!(true));
        assert_eq!(value["customerInfo"]["ndisNumber"], json!(""));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let draft: QuoteDraft =
            serde_json::from_value(json!({ "cleaningType": "deep" })).unwrap();
        assert_eq!(draft.cleaning_type, Some(CleaningType::Deep));
        assert_eq!(draft.urgency, Some(Urgency::Standard));
        assert_eq!(draft.total_rooms(), 0);
    }

    #[test]
    fn test_step_ordering() {
        assert_eq!(WizardStep::ServiceSelection.previous(), None);
        assert_eq!(WizardStep::ContactInfo.next(), None);
        for pair in WizardStep::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert_eq!(pair[1].previous(), Some(pair[0]));
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_catalog_keys_match_serde_names() {
        for cleaning_type in CleaningType::ALL {
            assert_eq!(
                serde_json::to_value(cleaning_type).unwrap(),
                json!(cleaning_type.key())
            );
        }
        for room in RoomType::ALL {
            assert_eq!(serde_json::to_value(room).unwrap(), json!(room.key()));
        }
    }
}
