//! History Entry Entity
//!
//! One broadcast action performed by a branch admin (notification sent,
//! message copied, voice note created).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::record::Record;
use super::scope::BranchId;

/// Kind of broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BroadcastType {
    /// Pawn loan reminders
    #[serde(rename = "Gadaian Broadcast")]
    Pawn,
    /// Installment reminders
    #[serde(rename = "Angsuran Broadcast")]
    Installment,
}

impl BroadcastType {
    pub const ALL: [BroadcastType; 2] = [BroadcastType::Pawn, BroadcastType::Installment];

    pub fn label(&self) -> &'static str {
        match self {
            BroadcastType::Pawn => "Gadaian Broadcast",
            BroadcastType::Installment => "Angsuran Broadcast",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Delivery outcome of a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "Pesan Disalin")]
    MessageCopied,
    #[serde(rename = "Pesan Suara Dibuat")]
    VoiceNoteCreated,
    #[serde(rename = "Notifikasi Terkirim")]
    NotificationSent,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::MessageCopied => "Pesan Disalin",
            DeliveryStatus::VoiceNoteCreated => "Pesan Suara Dibuat",
            DeliveryStatus::NotificationSent => "Notifikasi Terkirim",
        }
    }
}

/// Urgency of the message template, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTone {
    Auction,
    Overdue,
    Reminder,
}

/// A logged broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub broadcast_type: BroadcastType,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_identifier: Option<String>,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub admin_user: String,
    pub upc: BranchId,
}

impl HistoryEntry {
    /// Customer identifier worth showing (placeholder "N/A" hidden)
    pub fn customer_identifier(&self) -> Option<&str> {
        self.customer_identifier
            .as_deref()
            .filter(|id| !id.is_empty() && *id != "N/A")
    }

    /// Calendar day of the broadcast in the given time zone
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }

    pub fn template_tone(&self) -> TemplateTone {
        if self.template.contains("lelang") {
            TemplateTone::Auction
        } else if self.template.contains("keterlambatan") {
            TemplateTone::Overdue
        } else {
            TemplateTone::Reminder
        }
    }
}

impl Record for HistoryEntry {
    const COLLECTION: &'static str = "history";

    fn id(&self) -> &str {
        &self.id
    }

    fn branch(&self) -> &BranchId {
        &self.upc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Document;
    use chrono::FixedOffset;
    use serde_json::json;

    fn doc(id: &str, kind: &str) -> Document {
        Document::from_value(
            id,
            json!({
                "timestamp": "2024-05-01T20:30:00Z",
                "type": kind,
                "customerName": "Budi",
                "customerIdentifier": "N/A",
                "status": "Notifikasi Terkirim",
                "template": "pengingat keterlambatan",
                "adminUser": "sari",
                "upc": "12001"
            }),
        )
    }

    #[test]
    fn test_decode_history_entry() {
        let entry = HistoryEntry::from_document(&doc("h1", "Angsuran Broadcast")).unwrap();
        assert_eq!(entry.broadcast_type, BroadcastType::Installment);
        assert_eq!(entry.status, DeliveryStatus::NotificationSent);
        assert_eq!(entry.customer_identifier(), None);
        assert_eq!(entry.template_tone(), TemplateTone::Overdue);
    }

    #[test]
    fn test_unknown_broadcast_type_is_rejected() {
        assert!(HistoryEntry::from_document(&doc("h2", "SMS Blast")).is_err());
    }

    #[test]
    fn test_day_follows_time_zone() {
        let entry = HistoryEntry::from_document(&doc("h3", "Gadaian Broadcast")).unwrap();
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(entry.day_in(&Utc), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(entry.day_in(&wib), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_broadcast_labels() {
        assert_eq!(BroadcastType::from_label("Gadaian Broadcast"), Some(BroadcastType::Pawn));
        assert_eq!(BroadcastType::from_label("all"), None);
    }
}
