//! HTTP tests for the document engine routes.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use docflow_api::{AppState, create_router};
use docflow_shared::types::UserId;
use docflow_store::Store;
use http_body_util::BodyExt;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    create_router(AppState::new(Store::default()))
}

struct Client {
    app: Router,
    actor: UserId,
}

impl Client {
    fn new() -> Self {
        Self {
            app: app(),
            actor: UserId::new(),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Actor-Id", self.actor.to_string());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body), &[]).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None, &[]).await
    }

    /// Submits and approves a document.
    async fn approve(&self, id: &str) -> Value {
        let (status, _) = self
            .send("POST", &format!("/api/v1/documents/{id}/submit"), None, &[])
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .post(&format!("/api/v1/documents/{id}/approve"), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    async fn create_quotation(&self, quantity: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/quotations",
                json!({
                    "customer_id": UserId::new().to_string(),
                    "tax_rate": "7",
                    "wht_rate": "3",
                    "line_items": [{
                        "description": "Steel bracket",
                        "unit": "pcs",
                        "quantity": quantity,
                        "unit_price": "100",
                        "discount": { "percent": "10" }
                    }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    /// Drives a quotation through to an approved receipt.
    async fn approved_receipt(&self, quantity: &str) -> Value {
        let quotation = self.create_quotation(quantity).await;
        let quotation_id = id_of(&quotation);
        self.approve(&quotation_id).await;

        let (status, invoice) = self
            .send("POST", &format!("/api/v1/quotations/{quotation_id}/invoice"), None, &[])
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let invoice_id = id_of(&invoice);
        self.approve(&invoice_id).await;

        let (status, _) = self
            .post(
                &format!("/api/v1/invoices/{invoice_id}/payments"),
                json!({ "amount": invoice["totals"]["net_amount"] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, receipt) = self
            .send("POST", &format!("/api/v1/invoices/{invoice_id}/receipt"), None, &[])
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.approve(&id_of(&receipt)).await
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = Client::new().get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_calculate_line_item() {
    let (status, body) = Client::new()
        .post(
            "/api/v1/calculations/line-item",
            json!({ "quantity": "10", "unit_price": "100", "discount": { "percent": "10" } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["discount_amount"]), dec!(100));
    assert_eq!(decimal(&body["total_amount"]), dec!(900));
}

#[tokio::test]
async fn test_calculate_document_totals() {
    let (status, body) = Client::new()
        .post(
            "/api/v1/calculations/document-totals",
            json!({
                "line_items": [
                    { "quantity": "10", "unit_price": "100", "discount": { "percent": "10" } }
                ],
                "tax_rate": "7",
                "wht_rate": "3",
                "deposit": { "percent": "50" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let totals = &body["totals"];
    assert_eq!(decimal(&totals["total_amount"]), dec!(963));
    assert_eq!(decimal(&totals["net_amount"]), dec!(936));
    assert_eq!(decimal(&totals["deposit_amount"]), dec!(481.5));
    assert_eq!(decimal(&totals["remaining_amount"]), dec!(454.5));
}

#[rstest]
#[case::zero_quantity(
    json!({ "quantity": "0", "unit_price": "10" }),
    StatusCode::BAD_REQUEST,
    "VALIDATION_ERROR"
)]
#[case::discount_above_line(
    json!({ "quantity": "1", "unit_price": "10", "discount": { "amount": "10.01" } }),
    StatusCode::BAD_REQUEST,
    "VALIDATION_ERROR"
)]
#[case::product_out_of_range(
    json!({ "quantity": "79228162514264337593543950335", "unit_price": "2" }),
    StatusCode::BAD_REQUEST,
    "VALIDATION_ERROR"
)]
#[tokio::test]
async fn test_line_item_refusals(
    #[case] payload: Value,
    #[case] expected_status: StatusCode,
    #[case] expected_code: &str,
) {
    let (status, body) = Client::new()
        .post("/api/v1/calculations/line-item", payload)
        .await;
    assert_eq!(status, expected_status);
    assert_eq!(body["error"], expected_code);
}

#[rstest]
#[case::deposit_above_total(
    json!({
        "line_items": [{ "quantity": "1", "unit_price": "10" }],
        "deposit": { "amount": "10.01" }
    }),
    StatusCode::UNPROCESSABLE_ENTITY,
    "DEPOSIT_EXCEEDS_TOTAL"
)]
#[case::tax_rate_out_of_range(
    json!({
        "line_items": [{ "quantity": "1", "unit_price": "10" }],
        "tax_rate": "101"
    }),
    StatusCode::BAD_REQUEST,
    "VALIDATION_ERROR"
)]
#[case::tax_out_of_range(
    json!({
        "line_items": [{ "quantity": "79228162514264337593543950335", "unit_price": "1" }],
        "tax_rate": "7"
    }),
    StatusCode::BAD_REQUEST,
    "VALIDATION_ERROR"
)]
#[tokio::test]
async fn test_document_totals_refusals(
    #[case] payload: Value,
    #[case] expected_status: StatusCode,
    #[case] expected_code: &str,
) {
    let (status, body) = Client::new()
        .post("/api/v1/calculations/document-totals", payload)
        .await;
    assert_eq!(status, expected_status);
    assert_eq!(body["error"], expected_code);
}

#[tokio::test]
async fn test_missing_actor_is_unauthorized() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/documents")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_actor_is_unauthorized() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/documents")
        .header("X-Actor-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quotation_lifecycle_and_double_conversion() {
    let client = Client::new();
    let quotation = client.create_quotation("10").await;
    assert_eq!(quotation["status"], "draft");
    assert_eq!(quotation["document_number"], "QT-000001");
    assert_eq!(decimal(&quotation["totals"]["net_amount"]), dec!(936));

    let id = id_of(&quotation);
    let approved = client.approve(&id).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["audit"]["approved_by"], client.actor.to_string());

    let uri = format!("/api/v1/quotations/{id}/invoice");
    let (status, invoice) = client.send("POST", &uri, None, &[]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["document_type"], "invoice");
    assert_eq!(invoice["overlay"]["kind"], "invoice");
    assert_eq!(invoice["overlay"]["payment_status"], "unpaid");

    let (status, body) = client.send("POST", &uri, None, &[]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_CONVERTED");
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let client = Client::new();
    let id = id_of(&client.create_quotation("1").await);
    client
        .send("POST", &format!("/api/v1/documents/{id}/submit"), None, &[])
        .await;

    let (status, body) = client
        .post(&format!("/api/v1/documents/{id}/reject"), json!({ "reason": "  " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "REJECTION_REASON_REQUIRED");

    let (status, body) = client
        .post(&format!("/api/v1/documents/{id}/reject"), json!({ "reason": "wrong customer" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["audit"]["rejection_reason"], "wrong customer");
}

#[tokio::test]
async fn test_edit_and_delete_draft() {
    let client = Client::new();
    let id = id_of(&client.create_quotation("10").await);

    let (status, body) = client
        .send(
            "PUT",
            &format!("/api/v1/documents/{id}"),
            Some(json!({ "tax_rate": "0", "wht_rate": "0" })),
            &[],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["totals"]["net_amount"]), dec!(900));

    let (status, body) = client
        .send("DELETE", &format!("/api/v1/documents/{id}"), None, &[])
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = client.get(&format!("/api/v1/documents/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delivery_idempotency_and_over_allocation() {
    let client = Client::new();
    let receipt = client.approved_receipt("100").await;
    let receipt_id = id_of(&receipt);
    let line_id = receipt["line_items"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/receipts/{receipt_id}/delivery-notes");
    let request = json!({
        "allocations": [{ "line_item_id": line_id, "delivery_quantity": "60" }]
    });

    let (status, first) = client
        .send("POST", &uri, Some(request.clone()), &[("Idempotency-Key", "dn-60")])
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    let (status, replay) = client
        .send("POST", &uri, Some(request), &[("Idempotency-Key", "dn-60")])
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(replay["id"], first["id"]);

    let (status, body) = client
        .send(
            "POST",
            &uri,
            Some(json!({
                "allocations": [{ "line_item_id": line_id, "delivery_quantity": "10" }]
            })),
            &[("Idempotency-Key", "dn-60")],
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "IDEMPOTENCY_CONFLICT");

    let (status, body) = client
        .post(
            &uri,
            json!({ "allocations": [{ "line_item_id": line_id, "delivery_quantity": "41" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "OVER_ALLOCATION");

    let (status, report) = client
        .get(&format!("/api/v1/documents/{receipt_id}/fulfillment"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&report["quantity_remaining"]), dec!(40));
    assert_eq!(report["status"], "partial");
}

#[tokio::test]
async fn test_record_delivery_completes_note_and_receipt() {
    let client = Client::new();
    let receipt = client.approved_receipt("5").await;
    let receipt_id = id_of(&receipt);
    let line_id = receipt["line_items"][0]["id"].as_str().unwrap().to_string();

    let (status, note) = client
        .post(
            &format!("/api/v1/receipts/{receipt_id}/delivery-notes"),
            json!({ "allocations": [{ "line_item_id": line_id, "delivery_quantity": "5" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = id_of(&note);
    let note = client.approve(&note_id).await;
    let note_line = note["line_items"][0]["id"].as_str().unwrap().to_string();

    let (status, note) = client
        .post(
            &format!("/api/v1/delivery-notes/{note_id}/deliveries"),
            json!({ "deliveries": [{ "line_item_id": note_line, "delivery_quantity": "5" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{note}");
    assert_eq!(note["status"], "completed");

    let (_, receipt) = client.get(&format!("/api/v1/documents/{receipt_id}")).await;
    assert_eq!(receipt["status"], "completed");
    assert_eq!(receipt["overlay"]["status"], "completed");
}

#[tokio::test]
async fn test_pricing_requests_to_quotation() {
    let client = Client::new();
    let customer_id = UserId::new().to_string();

    let (status, request) = client
        .post(
            "/api/v1/pricing-requests",
            json!({
                "customer_id": customer_id,
                "description": "Custom enclosure",
                "quantity": "4",
                "unit": "pcs"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{request}");
    assert_eq!(request["status"], "requested");
    let request_id = id_of(&request);

    let (status, body) = client
        .post(
            "/api/v1/quotations/from-pricing-requests",
            json!({ "pricing_request_ids": [request_id] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SOURCE_NOT_ELIGIBLE");

    let (status, _) = client
        .post(
            &format!("/api/v1/pricing-requests/{request_id}/price"),
            json!({ "unit_price": "25" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, quotation) = client
        .post(
            "/api/v1/quotations/from-pricing-requests",
            json!({ "pricing_request_ids": [request_id], "tax_rate": "7" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{quotation}");
    assert_eq!(decimal(&quotation["totals"]["total_amount"]), dec!(107));

    let (_, request) = client.get(&format!("/api/v1/pricing-requests/{request_id}")).await;
    assert_eq!(request["quotation_id"], quotation["id"]);
}

#[tokio::test]
async fn test_list_documents_by_type() {
    let client = Client::new();
    client.create_quotation("1").await;
    client.create_quotation("2").await;

    let (status, page) = client.get("/api/v1/documents?type=quotation&per_page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 2);
    assert_eq!(page["meta"]["total_pages"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    let (_, page) = client.get("/api/v1/documents?type=invoice").await;
    assert_eq!(page["meta"]["total"], 0);
}
