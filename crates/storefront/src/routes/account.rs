//! Account route handlers.
//!
//! These routes require authentication. A token the API rejects surfaces as
//! `ApiError::Unauthorized`, which signs the customer out and redirects to
//! login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use harbor_core::{AddressId, OrderId, Phone};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{Address, AddressInput, ApiError, Location};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash::{Flash, set_flash};
use crate::middleware::RequireAuth;
use crate::models::keys;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::{
    AddressView, LocationOptionView, OrderDetailView, OrderSummaryView, PaginationView,
};

/// Orders shown on the account overview.
const RECENT_ORDERS: usize = 3;

// =============================================================================
// Form Types
// =============================================================================

/// Query parameters for the order history.
#[derive(Debug, Deserialize)]
pub struct OrdersParams {
    pub page: Option<u32>,
}

/// Address form data. `is_default` is a checkbox, present only when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressFormData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub province_code: String,
    #[serde(default)]
    pub district_code: String,
    #[serde(default)]
    pub ward_code: String,
    #[serde(default)]
    pub is_default: Option<String>,
}

impl AddressFormData {
    /// Check the form and build the API body.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or invalid.
    pub fn validate(&self) -> std::result::Result<AddressInput, &'static str> {
        let required = |value: &str| value.trim().to_string();
        let first_name = required(&self.first_name);
        let last_name = required(&self.last_name);
        if first_name.is_empty() || last_name.is_empty() {
            return Err("Enter a first and last name.");
        }
        let phone = Phone::parse(&self.phone).map_err(|_| "Enter a valid phone number.")?;
        let address1 = required(&self.address1);
        if address1.is_empty() {
            return Err("Enter a street address.");
        }
        let (province_code, district_code, ward_code) = (
            required(&self.province_code),
            required(&self.district_code),
            required(&self.ward_code),
        );
        if province_code.is_empty() || district_code.is_empty() || ward_code.is_empty() {
            return Err("Choose a province, district and ward.");
        }

        let address2 = self.address2.trim();
        Ok(AddressInput {
            first_name,
            last_name,
            phone: phone.as_str().to_string(),
            address1,
            address2: (!address2.is_empty()).then(|| address2.to_string()),
            province_code,
            district_code,
            ward_code,
            is_default: self.is_default.is_some(),
        })
    }
}

impl From<&Address> for AddressFormData {
    fn from(address: &Address) -> Self {
        Self {
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            phone: address.phone.clone(),
            address1: address.address1.clone(),
            address2: address.address2.clone().unwrap_or_default(),
            province_code: address.province.code.clone(),
            district_code: address.district.code.clone(),
            ward_code: address.ward.code.clone(),
            is_default: address.is_default.then(|| "on".to_string()),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub ctx: PageContext,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Most recent orders only.
    pub orders: Vec<OrderSummaryView>,
    pub default_address: Option<AddressView>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub ctx: PageContext,
    pub orders: Vec<OrderSummaryView>,
    pub pagination: PaginationView,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub ctx: PageContext,
    pub order: OrderDetailView,
}

/// Address book template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub ctx: PageContext,
    pub addresses: Vec<AddressView>,
}

/// New/edit address template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address_form.html")]
pub struct AddressFormTemplate {
    pub ctx: PageContext,
    pub title: &'static str,
    pub action: String,
    pub error: Option<String>,
    pub values: AddressFormData,
    pub provinces: Vec<LocationOptionView>,
    pub districts: Vec<LocationOptionView>,
    pub wards: Vec<LocationOptionView>,
}

impl AddressFormTemplate {
    /// Render the form with region pickers loaded for the chosen codes.
    async fn load(
        state: &AppState,
        ctx: PageContext,
        title: &'static str,
        action: String,
        values: AddressFormData,
        error: Option<String>,
    ) -> Result<Self> {
        let api = state.api();
        let provinces = api.get_provinces().await?;
        let districts = match values.province_code.trim() {
            "" => Vec::new(),
            code => api.get_districts(code).await?,
        };
        let wards = match values.district_code.trim() {
            "" => Vec::new(),
            code => api.get_wards(code).await?,
        };

        let options = |locations: &[Location], code: &str| {
            LocationOptionView::list(locations, Some(code.trim()))
        };
        Ok(Self {
            provinces: options(&provinces, &values.province_code),
            districts: options(&districts, &values.district_code),
            wards: options(&wards, &values.ward_code),
            ctx,
            title,
            action,
            error,
            values,
        })
    }
}

async fn find_address(state: &AppState, customer: &RequireAuth, id: AddressId) -> Result<Address> {
    state
        .api()
        .get_addresses(&customer.0.token())
        .await?
        .into_iter()
        .find(|address| address.id == id)
        .ok_or_else(|| AppError::NotFound(format!("address {id}")))
}

// =============================================================================
// Overview & Orders
// =============================================================================

/// Display account overview page.
///
/// Refreshes the session's display name from the profile.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut current): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let token = current.token();
    let api = state.api();

    let (customer, orders, addresses) = tokio::join!(
        api.get_customer(&token),
        api.get_orders(&token, 1),
        api.get_addresses(&token),
    );
    let customer = customer?;

    current.update_profile(&customer);
    session.insert(keys::CURRENT_CUSTOMER, &current).await?;

    let orders = orders?
        .items
        .iter()
        .take(RECENT_ORDERS)
        .map(|order| OrderSummaryView::new(order, state.currency()))
        .collect();

    let addresses = addresses?;
    let default_address = customer
        .default_address_id
        .and_then(|id| addresses.iter().find(|a| a.id == id))
        .or_else(|| addresses.iter().find(|a| a.is_default))
        .map(AddressView::from);

    let name = customer.full_name();
    Ok(AccountIndexTemplate {
        ctx,
        name: if name.is_empty() {
            customer.email.clone()
        } else {
            name
        },
        email: customer.email,
        phone: customer.phone.filter(|p| !p.is_empty()),
        orders,
        default_address,
    })
}

/// Display order history.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ctx: PageContext,
    Query(params): Query<OrdersParams>,
) -> Result<impl IntoResponse> {
    let page = params.page.unwrap_or(1).max(1);
    let orders = state.api().get_orders(&customer.token(), page).await?;

    Ok(OrdersTemplate {
        ctx,
        orders: orders
            .items
            .iter()
            .map(|order| OrderSummaryView::new(order, state.currency()))
            .collect(),
        pagination: PaginationView::new(orders.page, orders.total_pages(), "/account/orders", &[]),
    })
}

/// Display one order.
#[instrument(skip(state, customer, ctx))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ctx: PageContext,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = state.api().get_order(&customer.token(), id).await?;

    Ok(OrderTemplate {
        ctx,
        order: OrderDetailView::new(&order, state.currency()),
    })
}

// =============================================================================
// Address Book
// =============================================================================

/// Display the address book.
#[instrument(skip_all)]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let addresses = state.api().get_addresses(&customer.token()).await?;

    Ok(AddressesTemplate {
        ctx,
        addresses: addresses.iter().map(AddressView::from).collect(),
    })
}

/// Display the new address form.
#[instrument(skip_all)]
pub async fn new_address(
    State(state): State<AppState>,
    _customer: RequireAuth,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    AddressFormTemplate::load(
        &state,
        ctx,
        "New address",
        "/account/addresses".to_string(),
        AddressFormData::default(),
        None,
    )
    .await
}

/// Create an address.
#[instrument(skip_all)]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    customer: RequireAuth,
    ctx: PageContext,
    Form(form): Form<AddressFormData>,
) -> Result<Response> {
    let action = "/account/addresses".to_string();
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_address(&state, ctx, "New address", action, form, message.to_string())
                .await;
        }
    };

    match state.api().create_address(&customer.0.token(), &input).await {
        Ok(_) => {
            set_flash(&session, Flash::success("Address saved.")).await;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        Err(ApiError::Validation(message)) => {
            invalid_address(&state, ctx, "New address", action, form, message).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the edit address form.
#[instrument(skip(state, customer, ctx))]
pub async fn edit_address(
    State(state): State<AppState>,
    customer: RequireAuth,
    ctx: PageContext,
    Path(id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    let address = find_address(&state, &customer, id).await?;

    AddressFormTemplate::load(
        &state,
        ctx,
        "Edit address",
        format!("/account/addresses/{id}"),
        AddressFormData::from(&address),
        None,
    )
    .await
}

/// Update an address.
#[instrument(skip(state, session, customer, ctx, form))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    customer: RequireAuth,
    ctx: PageContext,
    Path(id): Path<AddressId>,
    Form(form): Form<AddressFormData>,
) -> Result<Response> {
    let action = format!("/account/addresses/{id}");
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return invalid_address(&state, ctx, "Edit address", action, form, message.to_string())
                .await;
        }
    };

    match state
        .api()
        .update_address(&customer.0.token(), id, &input)
        .await
    {
        Ok(_) => {
            set_flash(&session, Flash::success("Address updated.")).await;
            Ok(Redirect::to("/account/addresses").into_response())
        }
        Err(ApiError::Validation(message)) => {
            invalid_address(&state, ctx, "Edit address", action, form, message).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete an address.
#[instrument(skip(state, session, customer))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    customer: RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Response> {
    state
        .api()
        .delete_address(&customer.0.token(), id)
        .await?;

    set_flash(&session, Flash::success("Address deleted.")).await;
    Ok(Redirect::to("/account/addresses").into_response())
}

/// Make an address the default.
#[instrument(skip(state, session, customer))]
pub async fn set_default_address(
    State(state): State<AppState>,
    session: Session,
    customer: RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Response> {
    state
        .api()
        .set_default_address(&customer.0.token(), id)
        .await?;

    set_flash(&session, Flash::success("Default address updated.")).await;
    Ok(Redirect::to("/account/addresses").into_response())
}

async fn invalid_address(
    state: &AppState,
    ctx: PageContext,
    title: &'static str,
    action: String,
    form: AddressFormData,
    message: String,
) -> Result<Response> {
    let template = AddressFormTemplate::load(state, ctx, title, action, form, Some(message)).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AddressFormData {
        AddressFormData {
            first_name: "Lan".to_string(),
            last_name: "Nguyen".to_string(),
            phone: "091 234 5678".to_string(),
            address1: "12 Hang Bac".to_string(),
            province_code: "01".to_string(),
            district_code: "001".to_string(),
            ward_code: "00001".to_string(),
            is_default: Some("on".to_string()),
            ..AddressFormData::default()
        }
    }

    #[test]
    fn test_address_form_validates() {
        let input = form().validate().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(input.phone, "0912345678");
        assert!(input.address2.is_none());
        assert!(input.is_default);
    }

    #[test]
    fn test_address_form_unchecked_default() {
        let mut form = form();
        form.is_default = None;
        let input = form.validate().unwrap_or_else(|e| panic!("{e}"));
        assert!(!input.is_default);
    }

    #[test]
    fn test_address_form_requires_location() {
        let mut form = form();
        form.ward_code = " ".to_string();
        assert_eq!(
            form.validate().err(),
            Some("Choose a province, district and ward.")
        );
    }

    #[test]
    fn test_address_form_rejects_bad_phone() {
        let mut form = form();
        form.phone = "call me".to_string();
        assert_eq!(form.validate().err(), Some("Enter a valid phone number."));
    }
}
