//! # Form Schemas
//!
//! Every admin form is a draft struct with `validator` rules. A draft is
//! normalized (trim, upper-case codes, blanks to `None`), validated, and
//! only then turned into a request payload. Nothing reaches the network
//! while a field is invalid.
//!
//! ## Submit Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draft ──► normalize() ──► validate() ──┬──► Err(FormErrors) ──► inline │
//! │                                         │                               │
//! │                                         └──► payload() ──► mutation     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use chrono::NaiveDate;

use crate::types::{
    BrandCreate, CategoryCreate, ConditionGrade, CreateSaleRequest, CustomerCreate, CustomerTier,
    CustomerType, InventoryUnitCreate, LocationPayload, LocationType, LoginRequest, PaymentMethod,
    PaymentRequest, PaymentTerms, PurchaseItemRecord, PurchaseRecord, PurchaseReturnItemRecord,
    PurchaseReturnRecord, ReturnReason, ReturnableItem, SaleItem, SkuCreate, SupplierCreate,
    SupplierTier, SupplierType, UnitTransfer,
};

// =============================================================================
// Field Errors
// =============================================================================

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message for a field, which is what a form shows inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges another set, prefixing its fields (`items[0].quantity`).
    pub fn merge_prefixed(&mut self, prefix: &str, other: FormErrors) {
        for (field, messages) in other.0 {
            let key = format!("{}.{}", prefix, field);
            self.0.entry(key).or_default().extend(messages);
        }
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .filter_map(|(field, messages)| messages.first().map(|m| format!("{}: {}", field, m)))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::new();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

impl From<BTreeMap<String, Vec<String>>> for FormErrors {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        FormErrors(map)
    }
}

// =============================================================================
// Form Contract
// =============================================================================

/// A validated form that produces a request payload.
pub trait FormSchema: Validate {
    type Payload;

    /// Cleans raw input in place before validation.
    fn normalize(&mut self) {}

    /// Rules that `validator` attributes cannot express.
    fn extra_checks(&self) -> FormErrors {
        FormErrors::new()
    }

    /// Builds the payload. Only called on a valid draft.
    fn payload(&self) -> Self::Payload;
}

/// Normalizes, validates and converts a draft.
///
/// The draft is normalized in place so what the user sees matches what was
/// checked.
pub fn check<F: FormSchema>(draft: &mut F) -> Result<F::Payload, FormErrors> {
    draft.normalize();
    let mut errors = match draft.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    };
    for (field, messages) in draft.extra_checks().0 {
        for message in messages {
            errors.add(field.clone(), message);
        }
    }
    errors.into_result()?;
    Ok(draft.payload())
}

// =============================================================================
// Custom Rules
// =============================================================================

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn is_code(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Declares a rule that rejects blank input with a fixed message.
macro_rules! required {
    ($($name:ident => $message:literal;)+) => {
        $(
            fn $name(value: &str) -> Result<(), ValidationError> {
                if value.trim().is_empty() {
                    Err(rule("required", $message))
                } else {
                    Ok(())
                }
            }
        )+
    };
}

required! {
    category_name_present => "Category name is required";
    brand_name_present => "Brand name is required";
    location_name_present => "Location name is required";
    address_present => "Address is required";
    city_present => "City is required";
    state_present => "State is required";
    country_present => "Country is required";
    supplier_code_present => "Supplier code is required";
    company_name_present => "Company name is required";
    sku_code_present => "SKU code is required";
    sku_name_present => "SKU name is required";
}

fn brand_code_format(value: &str) -> Result<(), ValidationError> {
    if is_code(value) {
        Ok(())
    } else {
        Err(rule(
            "format",
            "Brand code must contain only uppercase letters, numbers, hyphens, and underscores",
        ))
    }
}

fn location_code_rules(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(rule("required", "Location code is required"))
    } else if !is_code(value) {
        Err(rule(
            "format",
            "Location code must contain only uppercase letters, numbers, hyphens, and underscores",
        ))
    } else {
        Ok(())
    }
}

fn e164(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('+').unwrap_or("");
    let ok = !digits.is_empty() && digits.len() <= 15 && digits.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(rule(
            "e164",
            "Contact number must be in E.164 format (e.g., +1234567890, max 15 digits)",
        ))
    }
}

fn blank_to_none(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            *value = None;
        } else if trimmed.len() != v.len() {
            *v = trimmed.to_string();
        }
    }
}

fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl FormSchema for LoginForm {
    type Payload = LoginRequest;

    fn normalize(&mut self) {
        trim(&mut self.email);
    }

    fn payload(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(
        custom(function = "category_name_present"),
        length(max = 255, message = "Category name must be 255 characters or less")
    )]
    pub name: String,
    /// `None` means "root category".
    pub parent_id: Option<String>,
    pub display_order: i32,
}

impl FormSchema for CategoryForm {
    type Payload = CategoryCreate;

    fn normalize(&mut self) {
        trim(&mut self.name);
        blank_to_none(&mut self.parent_id);
    }

    fn payload(&self) -> CategoryCreate {
        CategoryCreate {
            category_name: self.name.trim().to_string(),
            parent_category_id: self.parent_id.clone(),
            display_order: self.display_order,
        }
    }
}

// =============================================================================
// Brand
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BrandForm {
    #[validate(
        custom(function = "brand_name_present"),
        length(max = 100, message = "Brand name must be 100 characters or less")
    )]
    pub brand_name: String,
    #[validate(
        length(max = 20, message = "Brand code must be 20 characters or less"),
        custom(function = "brand_code_format")
    )]
    pub brand_code: Option<String>,
    #[validate(length(max = 1000, message = "Description must be 1000 characters or less"))]
    pub description: Option<String>,
}

impl FormSchema for BrandForm {
    type Payload = BrandCreate;

    fn normalize(&mut self) {
        trim(&mut self.brand_name);
        blank_to_none(&mut self.brand_code);
        if let Some(code) = self.brand_code.as_mut() {
            *code = code.to_uppercase();
        }
        blank_to_none(&mut self.description);
    }

    fn payload(&self) -> BrandCreate {
        BrandCreate {
            brand_name: self.brand_name.clone(),
            brand_code: self.brand_code.clone(),
            description: self.description.clone(),
        }
    }
}

// =============================================================================
// Location
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationForm {
    #[validate(
        custom(function = "location_code_rules"),
        length(max = 20, message = "Location code must be 20 characters or less")
    )]
    pub location_code: String,
    #[validate(
        custom(function = "location_name_present"),
        length(max = 100, message = "Location name must be 100 characters or less")
    )]
    pub location_name: String,
    pub location_type: LocationType,
    #[validate(
        custom(function = "address_present"),
        length(max = 500, message = "Address must be 500 characters or less")
    )]
    pub address: String,
    #[validate(
        custom(function = "city_present"),
        length(max = 50, message = "City must be 50 characters or less")
    )]
    pub city: String,
    #[validate(
        custom(function = "state_present"),
        length(max = 50, message = "State must be 50 characters or less")
    )]
    pub state: String,
    #[validate(
        custom(function = "country_present"),
        length(max = 50, message = "Country must be 50 characters or less")
    )]
    pub country: String,
    #[validate(length(max = 20, message = "Postal code must be 20 characters or less"))]
    pub postal_code: Option<String>,
    #[validate(
        length(max = 20, message = "Contact number must be 20 characters or less"),
        custom(function = "e164")
    )]
    pub contact_number: Option<String>,
    #[validate(
        email(message = "Please enter a valid email address"),
        length(max = 100, message = "Email must be 100 characters or less")
    )]
    pub email: Option<String>,
    pub manager_user_id: Option<String>,
}

impl FormSchema for LocationForm {
    type Payload = LocationPayload;

    fn normalize(&mut self) {
        self.location_code = self.location_code.trim().to_uppercase();
        trim(&mut self.location_name);
        trim(&mut self.address);
        trim(&mut self.city);
        trim(&mut self.state);
        trim(&mut self.country);
        blank_to_none(&mut self.postal_code);
        blank_to_none(&mut self.contact_number);
        blank_to_none(&mut self.email);
        blank_to_none(&mut self.manager_user_id);
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.location_type == LocationType::Other {
            errors.add("location_type", "Choose a warehouse, store or service center");
        }
        errors
    }

    fn payload(&self) -> LocationPayload {
        LocationPayload {
            location_code: self.location_code.clone(),
            location_name: self.location_name.clone(),
            location_type: self.location_type,
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            postal_code: self.postal_code.clone(),
            contact_number: self.contact_number.clone(),
            email: self.email.clone(),
            manager_user_id: self.manager_user_id.clone(),
        }
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SupplierForm {
    #[validate(
        custom(function = "supplier_code_present"),
        length(max = 50, message = "Supplier code must be 50 characters or less")
    )]
    pub supplier_code: String,
    #[validate(
        custom(function = "company_name_present"),
        length(max = 255, message = "Company name must be 255 characters or less")
    )]
    pub company_name: String,
    pub supplier_type: SupplierType,
    pub contact_person: Option<String>,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub payment_terms: Option<PaymentTerms>,
    #[validate(range(min = 0.0, message = "Credit limit cannot be negative"))]
    pub credit_limit: Option<f64>,
    pub supplier_tier: SupplierTier,
}

impl Default for SupplierForm {
    fn default() -> Self {
        SupplierForm {
            supplier_code: String::new(),
            company_name: String::new(),
            supplier_type: SupplierType::Distributor,
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            tax_id: None,
            payment_terms: Some(PaymentTerms::Net30),
            credit_limit: None,
            supplier_tier: SupplierTier::Standard,
        }
    }
}

impl FormSchema for SupplierForm {
    type Payload = SupplierCreate;

    fn normalize(&mut self) {
        self.supplier_code = self.supplier_code.trim().to_uppercase();
        trim(&mut self.company_name);
        blank_to_none(&mut self.contact_person);
        blank_to_none(&mut self.email);
        blank_to_none(&mut self.phone);
        blank_to_none(&mut self.address);
        blank_to_none(&mut self.tax_id);
    }

    fn payload(&self) -> SupplierCreate {
        SupplierCreate {
            supplier_code: self.supplier_code.clone(),
            company_name: self.company_name.clone(),
            supplier_type: self.supplier_type,
            contact_person: self.contact_person.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            tax_id: self.tax_id.clone(),
            payment_terms: self.payment_terms,
            credit_limit: self.credit_limit,
            supplier_tier: Some(self.supplier_tier),
        }
    }
}

// =============================================================================
// SKU
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SkuForm {
    #[validate(
        custom(function = "sku_code_present"),
        length(max = 50, message = "SKU code must be 50 characters or less")
    )]
    pub sku_code: String,
    #[validate(
        custom(function = "sku_name_present"),
        length(max = 200, message = "SKU name must be 200 characters or less")
    )]
    pub sku_name: String,
    #[validate(length(min = 1, message = "Item is required"))]
    pub item_id: String,
    pub barcode: Option<String>,
    pub model_number: Option<String>,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: Option<f64>,
    pub is_rentable: bool,
    pub is_saleable: bool,
    #[validate(range(min = 1, message = "Minimum rental days must be at least 1"))]
    pub min_rental_days: u32,
    pub max_rental_days: Option<u32>,
    #[validate(range(min = 0.0, message = "Rental price cannot be negative"))]
    pub rental_base_price: Option<f64>,
    #[validate(range(min = 0.0, message = "Sale price cannot be negative"))]
    pub sale_base_price: Option<f64>,
}

impl Default for SkuForm {
    fn default() -> Self {
        SkuForm {
            sku_code: String::new(),
            sku_name: String::new(),
            item_id: String::new(),
            barcode: None,
            model_number: None,
            weight: None,
            is_rentable: false,
            is_saleable: true,
            min_rental_days: 1,
            max_rental_days: None,
            rental_base_price: None,
            sale_base_price: None,
        }
    }
}

impl FormSchema for SkuForm {
    type Payload = SkuCreate;

    fn normalize(&mut self) {
        self.sku_code = self.sku_code.trim().to_uppercase();
        trim(&mut self.sku_name);
        trim(&mut self.item_id);
        blank_to_none(&mut self.barcode);
        blank_to_none(&mut self.model_number);
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if let Some(max) = self.max_rental_days {
            if max < self.min_rental_days {
                errors.add(
                    "max_rental_days",
                    "Maximum rental days must be greater than or equal to minimum",
                );
            }
        }
        if !self.is_rentable && !self.is_saleable {
            errors.add("is_saleable", "A SKU must be rentable, saleable, or both");
        }
        errors
    }

    fn payload(&self) -> SkuCreate {
        SkuCreate {
            sku_code: self.sku_code.clone(),
            sku_name: self.sku_name.clone(),
            item_id: self.item_id.clone(),
            barcode: self.barcode.clone(),
            model_number: self.model_number.clone(),
            weight: self.weight,
            is_rentable: self.is_rentable,
            is_saleable: self.is_saleable,
            min_rental_days: self.min_rental_days,
            max_rental_days: self.max_rental_days,
            rental_base_price: self.rental_base_price,
            sale_base_price: self.sale_base_price,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SaleLineForm {
    #[validate(length(min = 1, message = "Item is required"))]
    pub item_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "Unit price cannot be negative"))]
    pub unit_price: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SaleForm {
    #[validate(length(min = 1, message = "Customer is required"))]
    pub customer_id: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location_id: String,
    #[validate(length(min = 1, message = "Add at least one item"))]
    pub items: Vec<SaleLineForm>,
    #[validate(range(min = 0.0, max = 100.0, message = "Tax rate must be between 0 and 100"))]
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
}

impl FormSchema for SaleForm {
    type Payload = CreateSaleRequest;

    fn normalize(&mut self) {
        trim(&mut self.customer_id);
        trim(&mut self.location_id);
        blank_to_none(&mut self.notes);
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        for (index, line) in self.items.iter().enumerate() {
            if let Err(e) = line.validate() {
                errors.merge_prefixed(&format!("items[{}]", index), FormErrors::from(e));
            }
        }
        errors
    }

    fn payload(&self) -> CreateSaleRequest {
        CreateSaleRequest {
            customer_id: self.customer_id.clone(),
            location_id: self.location_id.clone(),
            items: self
                .items
                .iter()
                .map(|line| SaleItem {
                    item_id: line.item_id.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount_percentage: line.discount_percentage,
                })
                .collect(),
            tax_rate: self.tax_rate,
            auto_reserve_inventory: Some(true),
            notes: self.notes.clone(),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PaymentForm {
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be greater than 0"))]
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

impl FormSchema for PaymentForm {
    type Payload = PaymentRequest;

    fn normalize(&mut self) {
        blank_to_none(&mut self.reference);
    }

    fn payload(&self) -> PaymentRequest {
        PaymentRequest {
            payment_amount: self.amount,
            payment_method: self.method,
            payment_reference: self.reference.clone(),
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// Most lines one purchase or return may carry.
pub const MAX_PURCHASE_ITEMS: usize = 50;
pub const MAX_LINE_QUANTITY: u32 = 10_000;
pub const MAX_UNIT_COST: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchaseLineForm {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "Unit cost must be positive"))]
    pub unit_cost: f64,
    pub condition: ConditionGrade,
    pub notes: Option<String>,
    pub location_id: Option<String>,
}

impl Default for PurchaseLineForm {
    fn default() -> Self {
        PurchaseLineForm {
            sku_id: String::new(),
            quantity: 1,
            unit_cost: 0.0,
            condition: ConditionGrade::A,
            notes: None,
            location_id: None,
        }
    }
}

impl PurchaseLineForm {
    fn line_errors(&self) -> FormErrors {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        if self.quantity > MAX_LINE_QUANTITY {
            errors.add("quantity", "Quantity cannot exceed 10000");
        }
        if self.unit_cost > MAX_UNIT_COST {
            errors.add("unit_cost", "Unit cost cannot exceed 1,000,000");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchaseForm {
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    pub purchase_date: Option<NaiveDate>,
    /// Latest date a purchase may carry; pages set it to the current date.
    pub today: Option<NaiveDate>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseLineForm>,
}

impl PurchaseForm {
    /// Running total shown under the line table.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|line| line.unit_cost * f64::from(line.quantity))
            .sum()
    }
}

impl FormSchema for PurchaseForm {
    type Payload = PurchaseRecord;

    fn normalize(&mut self) {
        trim(&mut self.supplier_id);
        blank_to_none(&mut self.reference_number);
        blank_to_none(&mut self.notes);
        for line in &mut self.items {
            trim(&mut line.sku_id);
            blank_to_none(&mut line.notes);
            blank_to_none(&mut line.location_id);
        }
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        match (self.purchase_date, self.today) {
            (None, _) => errors.add("purchase_date", "Purchase date is required"),
            (Some(date), Some(today)) if date > today => {
                errors.add("purchase_date", "Purchase date cannot be in the future")
            }
            _ => {}
        }
        if self.items.len() > MAX_PURCHASE_ITEMS {
            errors.add("items", "Maximum 50 items allowed per purchase");
        }
        for (index, line) in self.items.iter().enumerate() {
            errors.merge_prefixed(&format!("items[{}]", index), line.line_errors());
        }
        errors
    }

    fn payload(&self) -> PurchaseRecord {
        PurchaseRecord {
            supplier_id: self.supplier_id.clone(),
            purchase_date: self.purchase_date.unwrap_or(NaiveDate::MIN),
            notes: self.notes.clone(),
            reference_number: self.reference_number.clone(),
            items: self
                .items
                .iter()
                .map(|line| PurchaseItemRecord {
                    sku_id: line.sku_id.clone(),
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    condition: line.condition,
                    notes: line.notes.clone(),
                    location_id: line.location_id.clone(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Purchase Return
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchaseReturnLineForm {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "Unit cost must be positive"))]
    pub unit_cost: f64,
    pub return_reason: ReturnReason,
    pub condition: Option<ConditionGrade>,
    pub notes: Option<String>,
}

/// What the return is checked against, loaded from the original purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnContext {
    pub purchase_date: Option<NaiveDate>,
    pub total_amount: f64,
    pub available: Vec<ReturnableItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchaseReturnForm {
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    #[validate(length(min = 1, message = "Original purchase is required"))]
    pub original_purchase_id: String,
    pub return_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Refund amount must be positive"))]
    pub refund_amount: f64,
    pub return_authorization: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseReturnLineForm>,
    pub original: Option<ReturnContext>,
}

impl FormSchema for PurchaseReturnForm {
    type Payload = PurchaseReturnRecord;

    fn normalize(&mut self) {
        trim(&mut self.supplier_id);
        trim(&mut self.original_purchase_id);
        blank_to_none(&mut self.return_authorization);
        blank_to_none(&mut self.notes);
        for line in &mut self.items {
            trim(&mut line.sku_id);
            blank_to_none(&mut line.notes);
        }
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.return_date.is_none() {
            errors.add("return_date", "Return date is required");
        }
        if self.items.len() > MAX_PURCHASE_ITEMS {
            errors.add("items", "Maximum 50 items allowed per return");
        }
        for (index, line) in self.items.iter().enumerate() {
            if let Err(e) = line.validate() {
                errors.merge_prefixed(&format!("items[{}]", index), FormErrors::from(e));
            }
        }

        let Some(original) = &self.original else {
            return errors;
        };
        if self.refund_amount > original.total_amount {
            errors.add(
                "refund_amount",
                "Refund amount cannot exceed original purchase amount",
            );
        }
        if let (Some(returned), Some(bought)) = (self.return_date, original.purchase_date) {
            if returned < bought {
                errors.add(
                    "return_date",
                    "Return date cannot be before the original purchase date",
                );
            }
        }
        for (index, line) in self.items.iter().enumerate() {
            if line.sku_id.is_empty() {
                continue;
            }
            let field = format!("items[{}].quantity", index);
            match original.available.iter().find(|a| a.sku_id == line.sku_id) {
                None => errors.add(
                    format!("items[{}].sku_id", index),
                    "SKU was not in the original purchase",
                ),
                Some(available) if line.quantity > available.max_returnable_quantity => {
                    errors.add(
                        field,
                        format!(
                            "Cannot return more than {} remaining",
                            available.max_returnable_quantity
                        ),
                    )
                }
                Some(_) => {}
            }
        }
        errors
    }

    fn payload(&self) -> PurchaseReturnRecord {
        PurchaseReturnRecord {
            supplier_id: self.supplier_id.clone(),
            original_purchase_id: self.original_purchase_id.clone(),
            return_date: self.return_date.unwrap_or(NaiveDate::MIN),
            refund_amount: self.refund_amount,
            return_authorization: self.return_authorization.clone(),
            notes: self.notes.clone(),
            items: self
                .items
                .iter()
                .map(|line| PurchaseReturnItemRecord {
                    sku_id: line.sku_id.clone(),
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    return_reason: line.return_reason,
                    condition: line.condition,
                    notes: line.notes.clone(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct InventoryUnitForm {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku_id: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location_id: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Purchase price cannot be negative"))]
    pub purchase_price: Option<f64>,
    pub condition_grade: ConditionGrade,
    pub notes: Option<String>,
}

impl FormSchema for InventoryUnitForm {
    type Payload = InventoryUnitCreate;

    fn normalize(&mut self) {
        trim(&mut self.sku_id);
        trim(&mut self.location_id);
        blank_to_none(&mut self.serial_number);
        blank_to_none(&mut self.notes);
    }

    fn payload(&self) -> InventoryUnitCreate {
        InventoryUnitCreate {
            sku_id: self.sku_id.clone(),
            location_id: self.location_id.clone(),
            serial_number: self.serial_number.clone(),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            condition_grade: self.condition_grade,
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransferForm {
    /// Where the unit sits now.
    pub from_location_id: String,
    #[validate(length(min = 1, message = "Destination location is required"))]
    pub to_location_id: String,
    pub transfer_notes: Option<String>,
}

impl FormSchema for TransferForm {
    type Payload = UnitTransfer;

    fn normalize(&mut self) {
        trim(&mut self.to_location_id);
        blank_to_none(&mut self.transfer_notes);
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if !self.to_location_id.is_empty() && self.to_location_id == self.from_location_id {
            errors.add(
                "to_location_id",
                "Destination must be different from the current location",
            );
        }
        errors
    }

    fn payload(&self) -> UnitTransfer {
        UnitTransfer {
            to_location_id: self.to_location_id.clone(),
            transfer_notes: self.transfer_notes.clone(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerForm {
    #[validate(length(min = 1, message = "Customer code is required"))]
    pub customer_code: String,
    pub customer_type: CustomerType,
    pub business_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tax_id: Option<String>,
    pub customer_tier: CustomerTier,
    #[validate(range(min = 0.0, message = "Credit limit cannot be negative"))]
    pub credit_limit: f64,
}

impl Default for CustomerForm {
    fn default() -> Self {
        CustomerForm {
            customer_code: String::new(),
            customer_type: CustomerType::Individual,
            business_name: None,
            first_name: None,
            last_name: None,
            tax_id: None,
            customer_tier: CustomerTier::Bronze,
            credit_limit: 0.0,
        }
    }
}

impl FormSchema for CustomerForm {
    type Payload = CustomerCreate;

    /// Names that do not apply to the chosen type are dropped.
    fn normalize(&mut self) {
        self.customer_code = self.customer_code.trim().to_uppercase();
        blank_to_none(&mut self.business_name);
        blank_to_none(&mut self.first_name);
        blank_to_none(&mut self.last_name);
        blank_to_none(&mut self.tax_id);
        match self.customer_type {
            CustomerType::Business => {
                self.first_name = None;
                self.last_name = None;
            }
            CustomerType::Individual => self.business_name = None,
        }
    }

    fn extra_checks(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        match self.customer_type {
            CustomerType::Business if self.business_name.is_none() => errors.add(
                "business_name",
                "Business name is required for business customers",
            ),
            CustomerType::Business => {}
            CustomerType::Individual => {
                if self.first_name.is_none() {
                    errors.add("first_name", "First name is required for individual customers");
                }
                if self.last_name.is_none() {
                    errors.add("last_name", "Last name is required for individual customers");
                }
            }
        }
        errors
    }

    fn payload(&self) -> CustomerCreate {
        CustomerCreate {
            customer_code: self.customer_code.clone(),
            customer_type: self.customer_type,
            business_name: self.business_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            tax_id: self.tax_id.clone(),
            customer_tier: Some(self.customer_tier),
            credit_limit: self.credit_limit,
        }
    }
}
