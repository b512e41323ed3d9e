//! Display data for the order templates.
//!
//! Templates only see strings and flags; everything that needs the catalog
//! or the draft is worked out here.

use certificate_order_core::{COUNTRIES, Catalog, Field, OrderDraft, SizeCode, Step};

/// Total number of wizard steps.
pub const STEP_COUNT: u8 = 4;

// =============================================================================
// Progress
// =============================================================================

/// One entry of the progress bar.
#[derive(Debug, Clone)]
pub struct StepView {
    pub number: u8,
    pub title: &'static str,
    pub done: bool,
    pub current: bool,
}

/// "Step N of 4" header and progress bar.
#[derive(Debug, Clone)]
pub struct ProgressView {
    pub number: u8,
    pub total: u8,
    pub percent: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub steps: Vec<StepView>,
}

impl From<Step> for ProgressView {
    fn from(current: Step) -> Self {
        Self {
            number: current.number(),
            total: STEP_COUNT,
            percent: current.number() * (100 / STEP_COUNT),
            title: current.title(),
            description: current.description(),
            steps: Step::ALL
                .iter()
                .map(|&step| StepView {
                    number: step.number(),
                    title: step.title(),
                    done: step < current,
                    current: step == current,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Upload
// =============================================================================

/// The uploaded image as shown on the upload and review screens.
#[derive(Debug, Clone)]
pub struct PreviewView {
    pub name: String,
    pub size: String,
    pub data_url: String,
}

impl PreviewView {
    #[must_use]
    pub fn from_draft(draft: &OrderDraft) -> Option<Self> {
        draft.image.as_ref().map(|image| Self {
            name: image.name().to_string(),
            size: format_file_size(image.size()),
            data_url: image.data_url().to_string(),
        })
    }
}

/// Human-readable file size, e.g. "1.4 MB".
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{}.{} MB", bytes / MB, (bytes % MB) * 10 / MB)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

// =============================================================================
// Size
// =============================================================================

/// A size card.
#[derive(Debug, Clone)]
pub struct SizeOptionView {
    pub code: &'static str,
    pub label: &'static str,
    pub dimensions: &'static str,
    pub price: String,
    pub featured: bool,
    pub selected: bool,
}

/// All size cards, marking the current selection.
#[must_use]
pub fn size_options(catalog: &Catalog, selected: Option<SizeCode>) -> Vec<SizeOptionView> {
    catalog
        .options()
        .iter()
        .map(|option| SizeOptionView {
            code: option.code.as_str(),
            label: option.label,
            dimensions: option.dimensions,
            price: option.price.display(),
            featured: option.featured,
            selected: selected == Some(option.code),
        })
        .collect()
}

// =============================================================================
// Details
// =============================================================================

/// Form field name used by the details form.
#[must_use]
pub const fn form_name(field: Field) -> &'static str {
    match field {
        Field::FirstName => "first_name",
        Field::LastName => "last_name",
        Field::Email => "email",
        Field::Phone => "phone",
        Field::Notes => "notes",
        Field::Address => "address",
        Field::City => "city",
        Field::PostalCode => "postal_code",
        Field::Country => "country",
    }
}

/// A text input on the details form.
#[derive(Debug, Clone)]
pub struct InputView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub autocomplete: &'static str,
    pub value: String,
    pub required: bool,
    pub missing: bool,
}

impl InputView {
    fn new(draft: &OrderDraft, field: Field, missing: &[Field]) -> Self {
        let (input_type, autocomplete) = match field {
            Field::FirstName => ("text", "given-name"),
            Field::LastName => ("text", "family-name"),
            Field::Email => ("email", "email"),
            Field::Phone => ("tel", "tel"),
            Field::Address => ("text", "street-address"),
            Field::City => ("text", "address-level2"),
            Field::PostalCode => ("text", "postal-code"),
            Field::Notes | Field::Country => ("text", "off"),
        };
        Self {
            name: form_name(field),
            label: field.label(),
            input_type,
            autocomplete,
            value: draft.field(field).to_string(),
            required: Field::REQUIRED_DETAILS.contains(&field),
            missing: missing.contains(&field),
        }
    }
}

/// A choice in the country drop-down.
#[derive(Debug, Clone)]
pub struct CountryOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Everything the details form shows.
#[derive(Debug, Clone)]
pub struct DetailsView {
    pub personal: Vec<InputView>,
    pub shipping: Vec<InputView>,
    pub notes: String,
    pub countries: Vec<CountryOption>,
    pub country_missing: bool,
}

impl DetailsView {
    /// Build the form from the draft, flagging `missing` fields.
    #[must_use]
    pub fn new(draft: &OrderDraft, missing: &[Field]) -> Self {
        let personal = [Field::FirstName, Field::LastName, Field::Email, Field::Phone]
            .into_iter()
            .map(|field| InputView::new(draft, field, missing))
            .collect();
        let shipping = [Field::Address, Field::City, Field::PostalCode]
            .into_iter()
            .map(|field| InputView::new(draft, field, missing))
            .collect();
        let countries = COUNTRIES
            .iter()
            .map(|&name| CountryOption {
                name,
                selected: draft.shipping.country == name,
            })
            .collect();

        Self {
            personal,
            shipping,
            notes: draft.notes.clone(),
            countries,
            country_missing: missing.contains(&Field::Country),
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// Order summary on the review and confirmation screens.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub image: Option<PreviewView>,
    pub size_label: &'static str,
    pub size_dimensions: String,
    pub price: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub address: String,
    pub city_line: String,
    pub country: String,
}

impl SummaryView {
    /// Summarise `draft`, resolving the size through the catalog.
    #[must_use]
    pub fn new(draft: &OrderDraft, catalog: &Catalog) -> Self {
        let code = draft.size.map_or("", SizeCode::as_str);
        let option = catalog.product_info(code);
        let personal = &draft.personal;
        let shipping = &draft.shipping;

        Self {
            image: PreviewView::from_draft(draft),
            size_label: option.label,
            size_dimensions: option.physical_dimensions(),
            price: option.price.display(),
            full_name: format!("{} {}", personal.first_name, personal.last_name),
            email: personal.email.clone(),
            phone: personal.phone.to_string(),
            notes: draft.notes.clone(),
            address: shipping.address.clone(),
            city_line: format!("{}, {}", shipping.city, shipping.postal_code),
            country: shipping.country.clone(),
        }
    }
}
