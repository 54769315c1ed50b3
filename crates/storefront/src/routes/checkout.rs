//! Checkout route handlers.
//!
//! The visitor edits a local [`CheckoutForm`] kept in the session. Every
//! effective edit is pushed to the remote checkout with a full
//! `PATCH /checkouts/{token}`; shipping rates are fetched again whenever a
//! complete province/district/ward is established. Field edits arrive from
//! htmx one at a time and answer with the re-rendered form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use harbor_core::{AddressId, CurrencyCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{
    Address, ApiError, Cart, Checkout, Location, Order, PaymentMethod, ShippingRate,
};
use crate::checkout::{CheckoutField, CheckoutForm, EditOutcome, FieldValue};
use crate::error::{AppError, FragmentError, Result, add_breadcrumb};
use crate::filters;
use crate::flash::{Flash, HX_TRIGGER, hx_trigger, set_flash};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentCustomer, keys};
use crate::page::PageContext;
use crate::routes::cart::current_cart;
use crate::state::AppState;
use crate::views::{
    AddressView, LineItemView, LocationOptionView, OrderDetailView, format_money,
};

// =============================================================================
// Form Types
// =============================================================================

/// One field edit.
#[derive(Debug, Deserialize)]
pub struct FieldForm {
    pub field: CheckoutField,
    #[serde(default)]
    pub value: String,
}

/// Saved address selection.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub address_id: AddressId,
}

/// Shipping rate selection.
#[derive(Debug, Deserialize)]
pub struct ShippingRateForm {
    pub rate_id: String,
}

/// Payment method selection.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodForm {
    pub payment_method: String,
}

/// Query for district options.
#[derive(Debug, Deserialize)]
pub struct DistrictParams {
    #[serde(default, alias = "province_code")]
    pub province: String,
}

/// Query for ward options.
#[derive(Debug, Deserialize)]
pub struct WardParams {
    #[serde(default, alias = "district_code")]
    pub district: String,
}

// =============================================================================
// Views
// =============================================================================

/// A saved address in the address picker.
#[derive(Clone)]
pub struct SavedAddressOption {
    pub address: AddressView,
    pub selected: bool,
}

/// A shipping rate radio button.
#[derive(Clone)]
pub struct ShippingRateOption {
    pub id: String,
    pub title: String,
    pub price: String,
    pub delivery_estimate: Option<String>,
    pub selected: bool,
}

/// A payment method radio button.
#[derive(Clone)]
pub struct PaymentMethodOption {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub selected: bool,
}

/// Order summary next to the form.
#[derive(Clone)]
pub struct CheckoutSummaryView {
    pub items: Vec<LineItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping_total: Option<String>,
    pub total: String,
}

impl CheckoutSummaryView {
    #[must_use]
    pub fn new(checkout: &Checkout, form: &CheckoutForm, fallback: CurrencyCode) -> Self {
        let currency = checkout.currency.unwrap_or(fallback);
        Self {
            items: LineItemView::list(&checkout.items, currency),
            item_count: checkout.item_count(),
            subtotal: format_money(checkout.subtotal, currency),
            shipping_total: form
                .shipping_rate_id()
                .map(|_| format_money(checkout.shipping_total, currency)),
            total: format_money(checkout.total, currency),
        }
    }
}

/// Region lists for the location pickers.
#[derive(Default)]
pub struct Regions {
    pub provinces: Vec<Location>,
    pub districts: Vec<Location>,
    pub wards: Vec<Location>,
}

/// Everything the checkout form fragment renders.
#[derive(Clone)]
pub struct CheckoutPanel {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address1: String,
    pub note: String,
    pub provinces: Vec<LocationOptionView>,
    pub districts: Vec<LocationOptionView>,
    pub wards: Vec<LocationOptionView>,
    pub saved_addresses: Vec<SavedAddressOption>,
    pub using_saved_address: bool,
    pub location_complete: bool,
    pub shipping_rates: Vec<ShippingRateOption>,
    pub payment_methods: Vec<PaymentMethodOption>,
    pub summary: CheckoutSummaryView,
    pub blockers: Vec<&'static str>,
    pub can_place_order: bool,
}

impl CheckoutPanel {
    #[must_use]
    pub fn new(
        form: &CheckoutForm,
        checkout: &Checkout,
        regions: &Regions,
        addresses: &[Address],
        methods: &[PaymentMethod],
        fallback: CurrencyCode,
    ) -> Self {
        let currency = checkout.currency.unwrap_or(fallback);
        let code = |location: Option<&Location>| location.map(|l| l.code.clone());
        let province = code(form.province());
        let district = code(form.district());
        let ward = code(form.ward());

        let shipping_rates = form
            .shipping_rates()
            .iter()
            .map(|rate: &ShippingRate| ShippingRateOption {
                id: rate.id.clone(),
                title: rate.title.clone(),
                price: format_money(rate.price, currency),
                delivery_estimate: rate.delivery_estimate.clone(),
                selected: form.shipping_rate_id() == Some(rate.id.as_str()),
            })
            .collect();

        let payment_methods = methods
            .iter()
            .map(|method| PaymentMethodOption {
                code: method.code.clone(),
                name: method.name.clone(),
                description: method.description.clone(),
                enabled: method.enabled,
                selected: form.payment_method() == Some(method.code.as_str()),
            })
            .collect();

        let saved_addresses = addresses
            .iter()
            .map(|address| SavedAddressOption {
                address: AddressView::from(address),
                selected: form.selected_address_id() == Some(address.id),
            })
            .collect();

        let item_count = checkout.item_count();

        Self {
            email: form.email().to_string(),
            first_name: form.first_name().to_string(),
            last_name: form.last_name().to_string(),
            phone: form.phone().to_string(),
            address1: form.address1().to_string(),
            note: form.note().to_string(),
            provinces: LocationOptionView::list(&regions.provinces, province.as_deref()),
            districts: LocationOptionView::list(&regions.districts, district.as_deref()),
            wards: LocationOptionView::list(&regions.wards, ward.as_deref()),
            saved_addresses,
            using_saved_address: form.selected_address_id().is_some(),
            location_complete: form.location_complete(),
            shipping_rates,
            payment_methods,
            summary: CheckoutSummaryView::new(checkout, form, fallback),
            blockers: form
                .place_order_blockers(item_count)
                .into_iter()
                .map(|blocker| blocker.message())
                .collect(),
            can_place_order: form.can_place_order(item_count),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub ctx: PageContext,
    pub panel: CheckoutPanel,
}

/// Checkout form fragment (for HTMX updates).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_form.html")]
pub struct CheckoutFormTemplate {
    pub panel: CheckoutPanel,
}

/// `<option>` list for a location picker.
#[derive(Template, WebTemplate)]
#[template(path = "partials/location_options.html")]
pub struct LocationOptionsTemplate {
    pub placeholder: &'static str,
    pub options: Vec<LocationOptionView>,
}

/// Order confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/thank_you.html")]
pub struct ThankYouTemplate {
    pub ctx: PageContext,
    pub number: String,
    pub order: Option<OrderDetailView>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Resume the session checkout, or start one from the cart.
///
/// A resumed checkout whose items no longer match the cart is replaced; the
/// visitor's form is kept and pushed to the new checkout.
async fn start_or_resume(
    state: &AppState,
    session: &Session,
    cart: &Cart,
    customer: Option<&CurrentCustomer>,
) -> Result<(String, CheckoutForm)> {
    let api = state.api();
    let saved_form = session.get::<CheckoutForm>(keys::CHECKOUT_FORM).await?;

    if let Some(token) = session.get::<String>(keys::CHECKOUT_TOKEN).await? {
        match api.get_checkout(&token).await {
            Ok(checkout) if checkout.same_lines_as(cart) => {
                let form = saved_form.unwrap_or_else(|| CheckoutForm::from_checkout(&checkout));
                return Ok((token, form));
            }
            Ok(_) => tracing::info!("Cart changed since checkout started, starting over"),
            Err(ApiError::NotFound(_)) => tracing::info!("Checkout expired, starting over"),
            Err(e) => return Err(e.into()),
        }
    }

    let email = customer.map(|c| c.email.clone());
    let token = customer.map(CurrentCustomer::token);
    let checkout = api
        .create_checkout(&cart.token, email, token.as_ref())
        .await?;
    tracing::info!("Started checkout");

    let form = match saved_form {
        Some(mut form) => {
            form.reset_shipping_rates();
            form
        }
        None => CheckoutForm::from_checkout(&checkout),
    };

    session.insert(keys::CHECKOUT_TOKEN, &checkout.token).await?;
    session.insert(keys::CHECKOUT_FORM, &form).await?;
    Ok((checkout.token, form))
}

/// Load the in-progress checkout token and form.
async fn load(state: &AppState, session: &Session) -> Result<(String, CheckoutForm)> {
    let token = session
        .get::<String>(keys::CHECKOUT_TOKEN)
        .await?
        .ok_or_else(|| AppError::BadRequest("Your checkout has expired. Please start again.".to_string()))?;

    let form = match session.get::<CheckoutForm>(keys::CHECKOUT_FORM).await? {
        Some(form) => form,
        None => CheckoutForm::from_checkout(&state.api().get_checkout(&token).await?),
    };
    Ok((token, form))
}

/// Push local changes, refresh shipping rates if asked or still pending, and
/// save the form.
///
/// The form is saved before pushing so a rejected update keeps the visitor's
/// input; it stays dirty and goes out with the next push. Pending rates stay
/// pending until a refresh succeeds.
async fn sync(
    state: &AppState,
    session: &Session,
    token: &str,
    form: &mut CheckoutForm,
    refresh_rates: bool,
) -> Result<Checkout> {
    let api = state.api();
    session.insert(keys::CHECKOUT_FORM, &*form).await?;

    let mut checkout = None;
    if form.is_dirty() {
        checkout = Some(api.update_checkout(token, &form.to_update()).await?);
        form.mark_synced();
    }

    if (refresh_rates || form.needs_shipping_rates()) && form.location_complete() {
        let rates = api.get_shipping_rates(token).await?;
        tracing::debug!(count = rates.len(), "Shipping rates refreshed");
        form.set_shipping_rates(rates);
        if form.is_dirty() {
            checkout = Some(api.update_checkout(token, &form.to_update()).await?);
            form.mark_synced();
        }
    }

    session.insert(keys::CHECKOUT_FORM, &*form).await?;

    match checkout {
        Some(checkout) => Ok(checkout),
        None => Ok(api.get_checkout(token).await?),
    }
}

/// Region lists for the current location.
async fn load_regions(state: &AppState, form: &CheckoutForm) -> Result<Regions> {
    let api = state.api();
    let provinces = api.get_provinces().await?;
    let districts = match form.province() {
        Some(province) => api.get_districts(&province.code).await?,
        None => Vec::new(),
    };
    let wards = match form.district() {
        Some(district) => api.get_wards(&district.code).await?,
        None => Vec::new(),
    };
    Ok(Regions {
        provinces,
        districts,
        wards,
    })
}

/// Look up the region node a picker value names. Blank clears the field.
async fn resolve_location(
    state: &AppState,
    form: &CheckoutForm,
    field: CheckoutField,
    code: &str,
) -> Result<Option<Location>> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(None);
    }

    let api = state.api();
    let options = match (field, form.province(), form.district()) {
        (CheckoutField::Province, _, _) => api.get_provinces().await?,
        (CheckoutField::District, Some(province), _) => api.get_districts(&province.code).await?,
        (CheckoutField::Ward, _, Some(district)) => api.get_wards(&district.code).await?,
        _ => Vec::new(),
    };

    options
        .into_iter()
        .find(|location| location.code == code)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest("Please choose a location from the list.".to_string()))
}

async fn saved_addresses(state: &AppState, customer: Option<&CurrentCustomer>) -> Result<Vec<Address>> {
    match customer {
        Some(customer) => Ok(state.api().get_addresses(&customer.token()).await?),
        None => Ok(Vec::new()),
    }
}

async fn build_panel(
    state: &AppState,
    form: &CheckoutForm,
    checkout: &Checkout,
    customer: Option<&CurrentCustomer>,
) -> Result<CheckoutPanel> {
    let regions = load_regions(state, form).await?;
    let addresses = saved_addresses(state, customer).await?;
    let methods = state.api().get_payment_methods().await?;
    Ok(CheckoutPanel::new(
        form,
        checkout,
        &regions,
        &addresses,
        &methods,
        state.currency(),
    ))
}

/// Re-rendered form, with a toast when the edit detached a saved address.
async fn form_fragment(
    state: &AppState,
    form: &CheckoutForm,
    checkout: &Checkout,
    customer: Option<&CurrentCustomer>,
    outcome: EditOutcome,
) -> std::result::Result<Response, FragmentError> {
    let panel = build_panel(state, form, checkout, customer).await?;
    let fragment = CheckoutFormTemplate { panel };

    if outcome.address_detached {
        let toast = Flash::info("Shipping to a new address. Your saved address is unchanged.");
        return Ok((
            AppendHeaders([(HX_TRIGGER, hx_trigger(&[], Some(&toast)))]),
            fragment,
        )
            .into_response());
    }
    Ok(fragment.into_response())
}

/// Escape an order number for use as a path segment.
fn order_path(number: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(number.as_bytes()).collect();
    format!("/checkout/thank-you/{encoded}")
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Start or resume checkout.
///
/// A fresh form for a signed-in customer is filled from their default
/// address.
#[instrument(skip(state, session, customer, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    ctx: PageContext,
) -> Result<Response> {
    let Some(cart) = current_cart(&state, &session)
        .await?
        .filter(|cart| !cart.is_empty())
    else {
        set_flash(&session, Flash::info("Your cart is empty.")).await;
        return Ok(Redirect::to("/cart").into_response());
    };

    let (token, mut form) = start_or_resume(&state, &session, &cart, customer.as_ref()).await?;
    let addresses = saved_addresses(&state, customer.as_ref()).await?;

    let mut refresh = form.location_complete() && form.shipping_rates().is_empty();
    if form.selected_address_id().is_none() && form.address1().is_empty() {
        if let Some(default) = addresses.iter().find(|address| address.is_default) {
            refresh |= form.select_address(default).refresh_shipping_rates;
        }
    }

    let checkout = sync(&state, &session, &token, &mut form, refresh).await?;
    let regions = load_regions(&state, &form).await?;
    let methods = state.api().get_payment_methods().await?;

    Ok(CheckoutShowTemplate {
        ctx,
        panel: CheckoutPanel::new(
            &form,
            &checkout,
            &regions,
            &addresses,
            &methods,
            state.currency(),
        ),
    }
    .into_response())
}

/// Edit one form field (HTMX).
#[instrument(skip(state, session, customer, input), fields(field = %input.field))]
pub async fn update_field(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<FieldForm>,
) -> std::result::Result<Response, FragmentError> {
    let (token, mut form) = load(&state, &session).await?;

    let value = if input.field.is_location() {
        FieldValue::from(resolve_location(&state, &form, input.field, &input.value).await?)
    } else {
        FieldValue::from(input.value.as_str())
    };
    let outcome = form.apply_edit(input.field, value)?;

    let checkout = sync(
        &state,
        &session,
        &token,
        &mut form,
        outcome.refresh_shipping_rates,
    )
    .await?;

    form_fragment(&state, &form, &checkout, customer.as_ref(), outcome).await
}

/// Fill the form from a saved address (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn select_address(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<AddressForm>,
) -> std::result::Result<Response, FragmentError> {
    let addresses = saved_addresses(&state, customer.as_ref()).await?;
    let address = addresses
        .iter()
        .find(|address| address.id == input.address_id)
        .ok_or_else(|| AppError::NotFound(format!("address {}", input.address_id)))?;

    let (token, mut form) = load(&state, &session).await?;
    let outcome = form.select_address(address);
    let checkout = sync(
        &state,
        &session,
        &token,
        &mut form,
        outcome.refresh_shipping_rates,
    )
    .await?;

    form_fragment(&state, &form, &checkout, customer.as_ref(), outcome).await
}

/// Choose a shipping rate (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn select_shipping_rate(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<ShippingRateForm>,
) -> std::result::Result<Response, FragmentError> {
    let (token, mut form) = load(&state, &session).await?;
    form.select_shipping_rate(&input.rate_id)?;
    let checkout = sync(&state, &session, &token, &mut form, false).await?;

    form_fragment(
        &state,
        &form,
        &checkout,
        customer.as_ref(),
        EditOutcome::default(),
    )
    .await
}

/// Choose a payment method (HTMX).
#[instrument(skip(state, session, customer))]
pub async fn select_payment_method(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(input): Form<PaymentMethodForm>,
) -> std::result::Result<Response, FragmentError> {
    let (token, mut form) = load(&state, &session).await?;
    let methods = state.api().get_payment_methods().await?;
    form.select_payment_method(&input.payment_method, &methods)?;
    let checkout = sync(&state, &session, &token, &mut form, false).await?;

    form_fragment(
        &state,
        &form,
        &checkout,
        customer.as_ref(),
        EditOutcome::default(),
    )
    .await
}

/// District `<option>`s for a province (HTMX).
#[instrument(skip(state))]
pub async fn districts(
    State(state): State<AppState>,
    Query(params): Query<DistrictParams>,
) -> std::result::Result<impl IntoResponse, FragmentError> {
    let province = params.province.trim();
    let districts = if province.is_empty() {
        Vec::new()
    } else {
        state.api().get_districts(province).await?
    };

    Ok(LocationOptionsTemplate {
        placeholder: "Select district",
        options: LocationOptionView::list(&districts, None),
    })
}

/// Ward `<option>`s for a district (HTMX).
#[instrument(skip(state))]
pub async fn wards(
    State(state): State<AppState>,
    Query(params): Query<WardParams>,
) -> std::result::Result<impl IntoResponse, FragmentError> {
    let district = params.district.trim();
    let wards = if district.is_empty() {
        Vec::new()
    } else {
        state.api().get_wards(district).await?
    };

    Ok(LocationOptionsTemplate {
        placeholder: "Select ward",
        options: LocationOptionView::list(&wards, None),
    })
}

/// Place the order.
///
/// Pending edits are pushed first. Anything still missing, or rejected by
/// the API, is shown as a toast back on the checkout page.
#[instrument(skip(state, session, customer))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response> {
    let back = || Redirect::to("/checkout").into_response();

    if session.get::<String>(keys::CHECKOUT_TOKEN).await?.is_none() {
        return Ok(back());
    }
    let (token, mut form) = load(&state, &session).await?;

    let checkout = match sync(&state, &session, &token, &mut form, false).await {
        Ok(checkout) => checkout,
        Err(AppError::Api(ApiError::Validation(message))) => {
            set_flash(&session, Flash::error(message)).await;
            return Ok(back());
        }
        Err(e) => return Err(e),
    };

    if let Some(blocker) = form.place_order_blockers(checkout.item_count()).first() {
        set_flash(&session, Flash::error(blocker.message())).await;
        return Ok(back());
    }

    let customer_token = customer.as_ref().map(CurrentCustomer::token);
    let order: Order = match state
        .api()
        .complete_checkout(&token, customer_token.as_ref())
        .await
    {
        Ok(order) => order,
        Err(ApiError::Validation(message)) => {
            set_flash(&session, Flash::error(message)).await;
            return Ok(back());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(order = %order.number, "Order placed");
    add_breadcrumb("checkout", "Order placed", Some(&[("order", &order.number)]));

    session.remove::<String>(keys::CHECKOUT_TOKEN).await?;
    session.remove::<CheckoutForm>(keys::CHECKOUT_FORM).await?;
    session.remove::<String>(keys::CART_TOKEN).await?;
    session.insert(keys::LAST_ORDER, &order).await?;

    Ok(Redirect::to(&order_path(&order.number)).into_response())
}

/// Order confirmation.
///
/// Shows the full order right after placing it; a revisit only shows the
/// number.
#[instrument(skip(state, session, ctx))]
pub async fn thank_you(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Path(number): Path<String>,
) -> Result<impl IntoResponse> {
    let order = take_last_order(&session, &number)
        .await?
        .map(|order| OrderDetailView::new(&order, state.currency()));

    Ok(ThankYouTemplate { ctx, number, order })
}

/// Remove and return the stored order if it is the one numbered `number`.
/// Another order stays in the session for its own confirmation page.
async fn take_last_order(session: &Session, number: &str) -> Result<Option<Order>> {
    let order = session
        .get::<Order>(keys::LAST_ORDER)
        .await?
        .filter(|order| order.number == number);
    if order.is_some() {
        session.remove::<Order>(keys::LAST_ORDER).await?;
    }
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checkout() -> Checkout {
        serde_json::from_str(
            r#"{
                "token": "chk_1",
                "items": [{"id": 1, "variant_id": 2, "product_handle": "tea", "title": "Tea",
                           "quantity": 2, "unit_price": "45000", "line_price": "90000"}],
                "subtotal": "90000",
                "shipping_total": "30000",
                "total": "120000"
            }"#,
        )
        .unwrap()
    }

    fn methods() -> Vec<PaymentMethod> {
        serde_json::from_str(
            r#"[{"code": "cod", "name": "Cash on delivery"},
                {"code": "card", "name": "Card", "enabled": false}]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_panel_for_empty_form() {
        let form = CheckoutForm::from_checkout(&checkout());
        let panel = CheckoutPanel::new(
            &form,
            &checkout(),
            &Regions::default(),
            &[],
            &methods(),
            CurrencyCode::VND,
        );

        assert!(!panel.can_place_order);
        assert!(panel.blockers.contains(&"Enter a valid email address."));
        assert!(!panel.location_complete);
        assert!(panel.shipping_rates.is_empty());
        assert_eq!(panel.summary.item_count, 2);
        assert_eq!(panel.summary.total, "120.000 ₫");
        assert!(panel.summary.shipping_total.is_none());
        assert!(!panel.payment_methods[1].enabled);
    }

    #[test]
    fn test_panel_marks_selected_province() {
        let mut form = CheckoutForm::default();
        let hanoi = Location {
            code: "01".to_string(),
            name: "Ha Noi".to_string(),
        };
        form.apply_edit(CheckoutField::Province, hanoi.clone()).unwrap();

        let regions = Regions {
            provinces: vec![
                hanoi,
                Location {
                    code: "79".to_string(),
                    name: "Ho Chi Minh".to_string(),
                },
            ],
            ..Regions::default()
        };
        let panel = CheckoutPanel::new(&form, &checkout(), &regions, &[], &[], CurrencyCode::VND);

        assert!(panel.provinces[0].selected);
        assert!(!panel.provinces[1].selected);
        assert!(panel.districts.is_empty());
    }

    #[test]
    fn test_order_path_escapes_number() {
        assert_eq!(order_path("HB1042"), "/checkout/thank-you/HB1042");
        assert_eq!(order_path("#1042"), "/checkout/thank-you/%231042");
    }

    fn order(number: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": 5001,
            "number": number,
            "created_at": "2026-02-14T08:30:00Z",
            "financial_status": "pending",
            "fulfillment_status": "unfulfilled",
            "items": [],
            "subtotal": "90000",
            "shipping_total": "30000",
            "total": "120000"
        }))
        .unwrap()
    }

    fn memory_session() -> Session {
        Session::new(None, std::sync::Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_other_order_page_keeps_last_order() {
        let session = memory_session();
        session.insert(keys::LAST_ORDER, order("HB1042")).await.unwrap();

        assert!(take_last_order(&session, "HB0001").await.unwrap().is_none());

        let taken = take_last_order(&session, "HB1042").await.unwrap().unwrap();
        assert_eq!(taken.number, "HB1042");
        assert!(take_last_order(&session, "HB1042").await.unwrap().is_none());
    }
}
