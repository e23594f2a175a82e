//! Client for the spreadsheet-backed data API.
//!
//! Every call targets one base URL with `fn` and `key` query parameters:
//! - `GET  ?fn=cliente&tel=…`    → `{nombre, dias[]}` or `null`
//! - `GET  ?fn=catalog`          → `[{nombre, medida, precio}]` or `null`
//! - `GET  ?fn=pedido.get&tel=…` → `{estado, items[]}` or `null`
//! - `POST ?fn=pedido.upsert`    with `{tel, nombre, items, estado}`
//!
//! Sheet cells are loosely typed, so numbers may arrive as JSON numbers or as
//! strings with a decimal comma.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use chatorder_catalog::{CatalogEntry, Unit, UnitHint};
use chatorder_core::CustomerPhone;
use chatorder_customers::Customer;
use chatorder_orders::{Order, OrderLine, OrderStatus};

use crate::store::{OrderStore, StoreError};

const STATUS_PENDING: &str = "PENDIENTE";
const STATUS_CONFIRMED: &str = "CONFIRMADO";

#[derive(Debug, Clone)]
pub struct DataApiClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl DataApiClient {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self::with_client(http, base_url, key))
    }

    /// Reuse an existing HTTP client (connection pool) for another base URL.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, StoreError> {
        tracing::debug!(function, "data API GET");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("fn", function), ("key", self.key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let body = Self::success_body(resp).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<T>>(&body)
            .map_err(|e| StoreError::Parse(format!("{function}: {e}")))
    }

    async fn post<B: Serialize + Sync>(&self, function: &str, body: &B) -> Result<(), StoreError> {
        tracing::debug!(function, "data API POST");
        let resp = self
            .http
            .post(&self.base_url)
            .query(&[("fn", function), ("key", self.key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Self::success_body(resp).await.map(|_| ())
    }

    async fn success_body(resp: reqwest::Response) -> Result<String, StoreError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(StoreError::Api(status.as_u16(), body));
        }
        Ok(body)
    }
}

/// Empty sheet cells come back as `null`; read them as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct CustomerDto {
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    dias: DaysDto,
}

/// Delivery days as a list, or as one comma-separated cell.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DaysDto {
    List(Vec<String>),
    Cell(String),
}

impl Default for DaysDto {
    fn default() -> Self {
        DaysDto::List(Vec::new())
    }
}

impl DaysDto {
    fn names(&self) -> Vec<&str> {
        match self {
            DaysDto::List(days) => days.iter().map(String::as_str).collect(),
            DaysDto::Cell(cell) => cell.split([',', ';', '/']).map(str::trim).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogItemDto {
    #[serde(default, deserialize_with = "null_as_default")]
    nombre: String,
    #[serde(default)]
    medida: Option<String>,
    #[serde(default)]
    precio: JsonValue,
}

#[derive(Debug, Deserialize)]
struct OrderDto {
    #[serde(default)]
    estado: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<OrderItemDto>,
}

#[derive(Debug, Deserialize)]
struct OrderItemDto {
    #[serde(default, deserialize_with = "null_as_default")]
    nombre: String,
    #[serde(default)]
    cantidad: JsonValue,
    #[serde(default)]
    unidad: Option<String>,
    #[serde(default)]
    precio: JsonValue,
}

#[derive(Debug, Serialize)]
struct OrderItemOut<'a> {
    nombre: &'a str,
    cantidad: Decimal,
    unidad: &'static str,
    precio: Decimal,
}

#[derive(Debug, Serialize)]
struct UpsertBody<'a> {
    tel: &'a str,
    nombre: &'a str,
    items: Vec<OrderItemOut<'a>>,
    estado: &'static str,
}

/// Read a sheet number: JSON number, or a string with `.` or `,` decimals.
fn decimal_from_json(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => {
            let raw = n.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .ok()
        }
        JsonValue::String(s) => {
            let s = s.trim().replace(',', ".");
            if s.is_empty() {
                None
            } else {
                Decimal::from_str(&s).ok()
            }
        }
        _ => None,
    }
}

fn status_from_label(label: Option<&str>) -> OrderStatus {
    match label.map(|s| s.trim().to_uppercase()).as_deref() {
        Some(STATUS_PENDING) => OrderStatus::Pending,
        Some(STATUS_CONFIRMED) => OrderStatus::Confirmed,
        _ => OrderStatus::NoOrder,
    }
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Confirmed => STATUS_CONFIRMED,
        // An order write always carries lines being worked on.
        OrderStatus::Pending | OrderStatus::NoOrder => STATUS_PENDING,
    }
}

fn catalog_entry(dto: CatalogItemDto) -> Option<CatalogEntry> {
    let price = decimal_from_json(&dto.precio).unwrap_or(Decimal::ZERO);
    let hint = dto
        .medida
        .as_deref()
        .map(UnitHint::from_measure)
        .unwrap_or_default();

    match CatalogEntry::new(dto.nombre.as_str(), hint, price) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!(name = %dto.nombre, error = %e, "skipping catalog entry");
            None
        }
    }
}

fn order_line(dto: OrderItemDto) -> Option<OrderLine> {
    let quantity = decimal_from_json(&dto.cantidad)?;
    let unit = dto
        .unidad
        .as_deref()
        .and_then(Unit::from_label)
        .unwrap_or(Unit::Unit);
    let price = decimal_from_json(&dto.precio).unwrap_or(Decimal::ZERO);

    match OrderLine::new(dto.nombre.as_str(), quantity, unit, price) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::warn!(name = %dto.nombre, error = %e, "skipping stored order line");
            None
        }
    }
}

#[async_trait::async_trait]
impl OrderStore for DataApiClient {
    async fn fetch_customer(&self, phone: &CustomerPhone) -> Result<Option<Customer>, StoreError> {
        let dto: Option<CustomerDto> = self.get("cliente", &[("tel", phone.as_str())]).await?;
        Ok(dto.map(|dto| Customer::from_day_names(dto.nombre.unwrap_or_default(), dto.dias.names())))
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let items: Option<Vec<CatalogItemDto>> = self.get("catalog", &[]).await?;
        Ok(items
            .unwrap_or_default()
            .into_iter()
            .filter_map(catalog_entry)
            .collect())
    }

    async fn fetch_order(&self, phone: &CustomerPhone) -> Result<Option<Order>, StoreError> {
        let dto: Option<OrderDto> = self.get("pedido.get", &[("tel", phone.as_str())]).await?;
        dto.map(|dto| {
            let status = status_from_label(dto.estado.as_deref());
            let lines = dto.items.into_iter().filter_map(order_line).collect();
            Order::restore(phone.clone(), status, lines)
        })
        .transpose()
        .map_err(|e| StoreError::Parse(format!("stored order: {e}")))
    }

    async fn replace_order(
        &self,
        phone: &CustomerPhone,
        customer_name: &str,
        lines: &[OrderLine],
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        let body = UpsertBody {
            tel: phone.as_str(),
            nombre: customer_name,
            items: lines
                .iter()
                .map(|line| OrderItemOut {
                    nombre: &line.product_name,
                    cantidad: line.quantity,
                    unidad: line.unit.label(),
                    precio: line.unit_price,
                })
                .collect(),
            estado: status_label(status),
        };
        self.post("pedido.upsert", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[derive(Clone, Default)]
    struct FakeSheet {
        posts: Arc<Mutex<Vec<(HashMap<String, String>, JsonValue)>>>,
    }

    async fn fake_get(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
        if params.get("key").map(String::as_str) != Some("secret") {
            return (StatusCode::FORBIDDEN, "bad key".to_string());
        }
        let body = match params.get("fn").map(String::as_str) {
            Some("cliente") if params.get("tel").map(String::as_str) == Some("5491122334455") => {
                json!({"nombre": "Ana", "dias": ["Martes", "viernes", "feriado"]})
            }
            Some("cliente") if params.get("tel").map(String::as_str) == Some("5491199999999") => {
                json!({"nombre": null, "dias": null})
            }
            Some("cliente") => JsonValue::Null,
            Some("catalog") => json!([
                {"nombre": "Picada Especial", "medida": "KG", "precio": 9500},
                {"nombre": "Milanesa Mediana", "medida": "CJ x 10", "precio": "42000,50"},
                {"nombre": "", "medida": "KG", "precio": 1},
                {"nombre": "Regalo", "precio": -5},
                {"nombre": null, "medida": null, "precio": null},
                {"nombre": "Pechuga"}
            ]),
            Some("pedido.get") if params.get("tel").map(String::as_str) == Some("5491199999999") => {
                json!({"estado": "CONFIRMADO", "items": null})
            }
            Some("pedido.get") => json!({
                "estado": "PENDIENTE",
                "items": [
                    {"nombre": "Pechuga", "cantidad": 2, "unidad": "UNI", "precio": 5200},
                    {"nombre": "pechuga", "cantidad": "1,5", "unidad": "UN", "precio": 5200},
                    {"nombre": "Nalga", "cantidad": 0, "unidad": "KG", "precio": 1},
                    {"nombre": null, "cantidad": 3, "unidad": null, "precio": null}
                ]
            }),
            Some("broken") => return (StatusCode::OK, "<html>".to_string()),
            _ => return (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        };
        (StatusCode::OK, body.to_string())
    }

    async fn fake_post(
        State(sheet): State<FakeSheet>,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<JsonValue>,
    ) -> Json<JsonValue> {
        sheet.posts.lock().unwrap().push((params, body));
        Json(json!({"ok": true}))
    }

    async fn spawn_fake() -> (DataApiClient, FakeSheet) {
        let sheet = FakeSheet::default();
        let app = Router::new()
            .route("/exec", get(fake_get).post(fake_post))
            .with_state(sheet.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            DataApiClient::new(format!("http://{addr}/exec"), "secret", Duration::from_secs(5)).unwrap();
        (client, sheet)
    }

    fn phone() -> CustomerPhone {
        "5491122334455".parse().unwrap()
    }

    #[tokio::test]
    async fn customer_days_are_parsed_and_unknown_phone_is_none() {
        let (client, _) = spawn_fake().await;

        let customer = client.fetch_customer(&phone()).await.unwrap().unwrap();
        assert_eq!(customer.name(), "Ana");
        assert_eq!(
            customer.allowed_weekdays(),
            &[chrono::Weekday::Tue, chrono::Weekday::Fri]
        );

        let other: CustomerPhone = "5491100000000".parse().unwrap();
        assert_eq!(client.fetch_customer(&other).await.unwrap(), None);
    }

    #[tokio::test]
    async fn catalog_skips_invalid_entries() {
        let (client, _) = spawn_fake().await;
        let catalog = client.fetch_catalog().await.unwrap();

        let names: Vec<&str> = catalog.iter().map(CatalogEntry::name).collect();
        assert_eq!(names, vec!["Picada Especial", "Milanesa Mediana", "Pechuga"]);
        assert_eq!(catalog[0].unit_hint(), UnitHint::Weight);
        assert_eq!(catalog[1].unit_hint(), UnitHint::Case);
        assert_eq!(catalog[1].price(), Decimal::new(4200050, 2));
        assert_eq!(catalog[2].price(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn stored_order_is_normalized_on_load() {
        let (client, _) = spawn_fake().await;
        let order = client.fetch_order(&phone()).await.unwrap().unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(
            order.lines(),
            &[OrderLine::new("Pechuga", Decimal::new(35, 1), Unit::Unit, Decimal::new(5200, 0)).unwrap()]
        );
    }

    #[tokio::test]
    async fn null_cells_read_as_empty() {
        let (client, _) = spawn_fake().await;
        let sparse: CustomerPhone = "5491199999999".parse().unwrap();

        let customer = client.fetch_customer(&sparse).await.unwrap().unwrap();
        assert_eq!(customer.name(), "");
        assert!(customer.allowed_weekdays().is_empty());

        let order = client.fetch_order(&sparse).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert!(order.lines().is_empty());
    }

    #[test]
    fn null_fields_deserialize_to_defaults() {
        let dto: CustomerDto = serde_json::from_value(json!({"nombre": "Ana", "dias": null})).unwrap();
        assert!(dto.dias.names().is_empty());

        let dto: OrderDto = serde_json::from_value(json!({"estado": "PENDIENTE", "items": null})).unwrap();
        assert!(dto.items.is_empty());

        let dto: CatalogItemDto = serde_json::from_value(json!({"nombre": null, "precio": 1})).unwrap();
        assert_eq!(catalog_entry(dto), None);

        let dto: OrderItemDto = serde_json::from_value(json!({"nombre": null, "cantidad": 2})).unwrap();
        assert_eq!(order_line(dto), None);
    }

    #[tokio::test]
    async fn replace_order_posts_sheet_shape() {
        let (client, sheet) = spawn_fake().await;
        let lines = vec![
            OrderLine::new("Picada Especial", Decimal::new(25, 1), Unit::Weight, Decimal::new(9500, 0)).unwrap(),
        ];

        client
            .replace_order(&phone(), "Ana", &lines, OrderStatus::Confirmed)
            .await
            .unwrap();

        let posts = sheet.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let (params, body) = &posts[0];
        assert_eq!(params.get("fn").map(String::as_str), Some("pedido.upsert"));
        assert_eq!(params.get("key").map(String::as_str), Some("secret"));
        assert_eq!(
            body,
            &json!({
                "tel": "5491122334455",
                "nombre": "Ana",
                "items": [{"nombre": "Picada Especial", "cantidad": 2.5, "unidad": "KG", "precio": 9500.0}],
                "estado": "CONFIRMADO"
            })
        );
    }

    #[tokio::test]
    async fn non_success_and_garbage_bodies_are_errors() {
        let (client, _) = spawn_fake().await;

        let err = client.get::<JsonValue>("unknown", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Api(500, _)));

        let err = client.get::<JsonValue>("broken", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));

        let wrong_key = DataApiClient::with_client(reqwest::Client::new(), client.base_url(), "nope");
        let err = wrong_key.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, StoreError::Api(403, _)));
    }

    #[test]
    fn sheet_numbers_accept_commas_and_strings() {
        assert_eq!(decimal_from_json(&json!(3)), Some(Decimal::new(3, 0)));
        assert_eq!(decimal_from_json(&json!(2.5)), Some(Decimal::new(25, 1)));
        assert_eq!(decimal_from_json(&json!("1,25")), Some(Decimal::new(125, 2)));
        assert_eq!(decimal_from_json(&json!("")), None);
        assert_eq!(decimal_from_json(&JsonValue::Null), None);
    }

    #[test]
    fn status_labels() {
        assert_eq!(status_from_label(Some("pendiente")), OrderStatus::Pending);
        assert_eq!(status_from_label(Some("CONFIRMADO")), OrderStatus::Confirmed);
        assert_eq!(status_from_label(None), OrderStatus::NoOrder);
        assert_eq!(status_label(OrderStatus::Pending), "PENDIENTE");
    }
}
