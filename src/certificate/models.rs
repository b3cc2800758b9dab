use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::format::format_calendar_date;
use crate::validation::{
    optional_text, validate_optional_date, validate_required, Validate, ValidationErrors,
};

/// Raw certificate request as posted by the frontend.
///
/// Free-text fields also accept JSON numbers, which are printed as written.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfRequest {
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Acme Rail")]
    pub vendor_name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "L-2024-001")]
    pub lot_number: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Fishplate")]
    pub item_type: Option<String>,
    #[schema(example = "2024-01-15")]
    pub manufacture_date: Option<String>,
    #[schema(example = "2024-02-01")]
    pub supply_date: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "5 years")]
    pub warranty_period: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }),
    )
}

/// Validated item details printed on a certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub vendor_name: String,
    pub lot_number: String,
    pub item_type: String,
    pub manufacture_date: Option<NaiveDate>,
    pub supply_date: Option<NaiveDate>,
    pub warranty_period: Option<String>,
}

impl Validate for GeneratePdfRequest {
    type Output = ItemRecord;

    fn validate(self) -> Result<ItemRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let vendor_name = validate_required(
            self.vendor_name.as_deref(),
            "vendorName",
            "Vendor Name",
            &mut errors,
        );
        let lot_number = validate_required(
            self.lot_number.as_deref(),
            "lotNumber",
            "Lot Number",
            &mut errors,
        );
        let item_type = validate_required(
            self.item_type.as_deref(),
            "itemType",
            "Item Type",
            &mut errors,
        );
        let manufacture_date = validate_optional_date(
            self.manufacture_date.as_deref(),
            "manufactureDate",
            &mut errors,
        );
        let supply_date =
            validate_optional_date(self.supply_date.as_deref(), "supplyDate", &mut errors);

        errors.into_result()?;

        Ok(ItemRecord {
            vendor_name,
            lot_number,
            item_type,
            manufacture_date,
            supply_date,
            warranty_period: optional_text(self.warranty_period.as_deref()),
        })
    }
}

/// A field value together with how it is printed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Date(NaiveDate),
}

impl FieldValue<'_> {
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.to_string(),
            FieldValue::Date(date) => format_calendar_date(*date),
        }
    }
}

/// One labeled row of the certificate body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow<'a> {
    pub label: &'static str,
    pub value: Option<FieldValue<'a>>,
    /// Extra vertical space after the row, in lines.
    pub gap_after: f32,
}

impl<'a> FieldRow<'a> {
    fn new(label: &'static str, value: Option<FieldValue<'a>>, gap_after: f32) -> Self {
        Self {
            label,
            value,
            gap_after,
        }
    }
}

impl ItemRecord {
    /// Every certificate row in print order, present or not.
    pub fn field_rows(&self) -> [FieldRow<'_>; 6] {
        let row = FieldRow::new;
        [
            row("Vendor Name", Some(FieldValue::Text(&self.vendor_name)), 0.5),
            row("Lot Number", Some(FieldValue::Text(&self.lot_number)), 0.5),
            row("Item Type", Some(FieldValue::Text(&self.item_type)), 0.5),
            row(
                "Manufacture Date",
                self.manufacture_date.map(FieldValue::Date),
                0.5,
            ),
            row("Supply Date", self.supply_date.map(FieldValue::Date), 0.5),
            row(
                "Warranty Period",
                self.warranty_period.as_deref().map(FieldValue::Text),
                1.0,
            ),
        ]
    }

    /// Rows that will actually be printed, as `(label, text, gap_after)`.
    pub fn printed_fields(&self) -> Vec<(&'static str, String, f32)> {
        self.field_rows()
            .into_iter()
            .filter_map(|row| row.value.map(|v| (row.label, v.render(), row.gap_after)))
            .collect()
    }
}

/// Summary of a stored certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionDescriptor {
    pub artifact_name: String,
    pub relative_path: String,
    pub absolute_url: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePdfResponse {
    pub success: bool,
    #[schema(example = "railway-item-1705312800000.pdf")]
    pub filename: String,
    #[schema(example = "/uploads/railway-item-1705312800000.pdf")]
    pub filepath: String,
    #[schema(example = 1705312800000i64)]
    pub timestamp: i64,
    #[schema(example = "http://localhost:5000/uploads/railway-item-1705312800000.pdf")]
    pub full_url: String,
}

impl From<CompletionDescriptor> for GeneratePdfResponse {
    fn from(descriptor: CompletionDescriptor) -> Self {
        Self {
            success: true,
            filename: descriptor.artifact_name,
            filepath: descriptor.relative_path,
            timestamp: descriptor.timestamp,
            full_url: descriptor.absolute_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> GeneratePdfRequest {
        serde_json::from_str(
            r#"{
                "vendorName": "Acme Rail",
                "lotNumber": "L-2024-001",
                "itemType": "Fishplate",
                "manufactureDate": "2024-01-15",
                "supplyDate": "2024-02-01",
                "warrantyPeriod": "5 years"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_request_deserialization() {
        let request = full_request();
        assert_eq!(request.vendor_name.as_deref(), Some("Acme Rail"));
        assert_eq!(request.warranty_period.as_deref(), Some("5 years"));
    }

    #[test]
    fn test_numeric_text_fields_are_accepted() {
        let request: GeneratePdfRequest = serde_json::from_str(
            r#"{
                "vendorName": "Acme Rail",
                "lotNumber": 2024001,
                "itemType": "Fishplate",
                "warrantyPeriod": 5
            }"#,
        )
        .unwrap();
        assert_eq!(request.lot_number.as_deref(), Some("2024001"));

        let record = request.validate().unwrap();
        assert_eq!(record.lot_number, "2024001");
        assert_eq!(record.warranty_period.as_deref(), Some("5"));
    }

    #[test]
    fn test_non_text_values_are_rejected() {
        let parsed = serde_json::from_str::<GeneratePdfRequest>(r#"{"lotNumber": ["L-1"]}"#);
        assert!(parsed.is_err());
        let parsed = serde_json::from_str::<GeneratePdfRequest>(r#"{"lotNumber": null}"#).unwrap();
        assert_eq!(parsed.lot_number, None);
    }

    #[test]
    fn test_validate_full_request() {
        let record = full_request().validate().unwrap();
        assert_eq!(record.lot_number, "L-2024-001");
        assert_eq!(record.manufacture_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(record.supply_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_validate_collects_all_missing_fields() {
        let errors = GeneratePdfRequest::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["vendorName", "lotNumber", "itemType"]);
    }

    #[test]
    fn test_printed_fields_order_and_formatting() {
        let record = full_request().validate().unwrap();
        let printed = record.printed_fields();
        let labels: Vec<_> = printed.iter().map(|(label, _, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "Vendor Name",
                "Lot Number",
                "Item Type",
                "Manufacture Date",
                "Supply Date",
                "Warranty Period"
            ]
        );
        assert_eq!(printed[3].1, "1/15/2024");
        assert_eq!(printed[4].1, "2/1/2024");
        assert_eq!(printed[5].2, 1.0);
    }

    #[test]
    fn test_absent_optionals_are_skipped() {
        let request = GeneratePdfRequest {
            vendor_name: Some("Acme Rail".into()),
            lot_number: Some("L-1".into()),
            item_type: Some("Sleeper".into()),
            supply_date: Some("".into()),
            warranty_period: Some("   ".into()),
            ..Default::default()
        };
        let record = request.validate().unwrap();
        let labels: Vec<_> = record.printed_fields().into_iter().map(|f| f.0).collect();
        assert_eq!(labels, vec!["Vendor Name", "Lot Number", "Item Type"]);
    }

    #[test]
    fn test_response_shape() {
        let response = GeneratePdfResponse::from(CompletionDescriptor {
            artifact_name: "railway-item-1.pdf".into(),
            relative_path: "/uploads/railway-item-1.pdf".into(),
            absolute_url: "http://localhost:5000/uploads/railway-item-1.pdf".into(),
            timestamp: 1,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["filepath"], "/uploads/railway-item-1.pdf");
        assert_eq!(json["fullUrl"], "http://localhost:5000/uploads/railway-item-1.pdf");
    }
}
