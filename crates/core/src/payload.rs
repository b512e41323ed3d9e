//! JSON body sent to the order endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::draft::{OrderDraft, PersonalData, ShippingData};
use crate::image::ImageUpload;
use crate::types::ProductId;

/// Image portion of the order body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    /// Data URL of the file contents.
    pub data: String,
}

impl From<&ImageUpload> for ImagePayload {
    fn from(image: &ImageUpload) -> Self {
        Self {
            name: image.name().to_string(),
            size: image.size(),
            mime_type: image.mime_type().to_string(),
            data: image.data_url().to_string(),
        }
    }
}

/// The complete order, serialized once per submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub image: Option<ImagePayload>,
    pub certificate_size: String,
    pub product_id: ProductId,
    pub personal_data: PersonalData,
    pub special_notes: String,
    pub shipping_data: ShippingData,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub order_date: String,
    /// Display price, e.g. "$89.99".
    pub price: String,
}

impl OrderPayload {
    /// Package a draft for submission.
    ///
    /// The size is resolved through [`Catalog::product_info`], so an unset or
    /// unknown size still yields the first catalog entry's id and price.
    #[must_use]
    pub fn build(draft: &OrderDraft, catalog: &Catalog, now: DateTime<Utc>) -> Self {
        let certificate_size = draft.size.map(|s| s.as_str().to_string()).unwrap_or_default();
        let product = catalog.product_info(&certificate_size);

        Self {
            image: draft.image.as_ref().map(ImagePayload::from),
            product_id: product.product_id,
            price: product.price.display(),
            certificate_size,
            personal_data: draft.personal.clone(),
            special_notes: draft.notes.clone(),
            shipping_data: draft.shipping.clone(),
            order_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::catalog::SizeCode;

    fn order_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_build_uses_catalog_entry() {
        let draft = OrderDraft {
            size: Some(SizeCode::SixBySix),
            ..OrderDraft::default()
        };
        let payload = OrderPayload::build(&draft, &Catalog::default(), order_time());
        assert_eq!(payload.certificate_size, "6x6");
        assert_eq!(payload.product_id, ProductId::new(4843));
        assert_eq!(payload.price, "$89.99");
        assert_eq!(payload.order_date, "2026-10-19T09:30:00.000Z");
        assert!(payload.image.is_none());
    }

    #[test]
    fn test_build_without_size_falls_back_to_first_entry() {
        let payload = OrderPayload::build(&OrderDraft::default(), &Catalog::default(), order_time());
        assert_eq!(payload.certificate_size, "");
        assert_eq!(payload.product_id, ProductId::new(4842));
        assert_eq!(payload.price, "$84.99");
    }

    #[test]
    fn test_json_shape() {
        let draft = OrderDraft {
            image: Some(ImageUpload::encode("photo.png", "image/png", b"png").unwrap()),
            size: Some(SizeCode::EightByEight),
            notes: "gold frame".to_string(),
            ..OrderDraft::default()
        };
        let payload = OrderPayload::build(&draft, &Catalog::default(), order_time());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["image"]["name"], "photo.png");
        assert_eq!(json["image"]["size"], 3);
        assert_eq!(json["image"]["mimeType"], "image/png");
        assert_eq!(json["image"]["data"], "data:image/png;base64,cG5n");
        assert_eq!(json["certificateSize"], "8x8");
        assert_eq!(json["productId"], 4844);
        assert_eq!(json["specialNotes"], "gold frame");
        assert_eq!(json["personalData"]["phone"], "");
        assert_eq!(json["shippingData"]["postalCode"], "");
        assert_eq!(json["orderDate"], "2026-10-19T09:30:00.000Z");
        assert_eq!(json["price"], "$99.99");
    }

    #[test]
    fn test_null_image_is_serialized() {
        let payload = OrderPayload::build(&OrderDraft::default(), &Catalog::default(), order_time());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["image"].is_null());
        assert!(json.as_object().unwrap().contains_key("image"));
    }
}
