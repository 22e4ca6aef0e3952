use crate::domain::models::payment::{
    parse_gateway_date, GatewayCharge, GatewayPaymentStatus, NewChargeRequest, PixQrCode,
};
use crate::domain::ports::PaymentGateway;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    async fn check(&self, res: reqwest::Response, context: &str) -> Result<reqwest::Response, AppError> {
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("{} failed. Status: {}, Body: {}", context, status, text);
            error!("{}", msg);
            return Err(AppError::Gateway(msg));
        }
        Ok(res)
    }

    fn connection_error(&self, context: &str, e: reqwest::Error) -> AppError {
        let msg = format!("{} connection error: {}", context, e);
        error!("{}", msg);
        AppError::Gateway(msg)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerPayload {
    name: String,
    email: String,
    cpf_cnpj: String,
    mobile_phone: String,
}

#[derive(Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Deserialize)]
struct CustomerSearchResponse {
    #[serde(default)]
    data: Vec<CustomerResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChargePayload {
    customer: String,
    billing_type: String,
    value: f64,
    due_date: String,
    description: String,
    external_reference: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChargeResponse {
    id: String,
    status: String,
    #[serde(default)]
    bank_slip_url: Option<String>,
    #[serde(default)]
    invoice_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PixQrCodeResponse {
    payload: String,
    encoded_image: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentStatusResponse {
    status: String,
    #[serde(default)]
    payment_date: Option<String>,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn find_or_create_customer(
        &self,
        name: &str,
        email: &str,
        cpf: &str,
        phone: &str,
    ) -> Result<String, AppError> {
        let search = self.client
            .get(format!("{}/customers", self.base_url))
            .query(&[("cpfCnpj", cpf)])
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(|e| self.connection_error("Customer lookup", e))?;

        let search = self.check(search, "Customer lookup").await?;
        let found: CustomerSearchResponse = search.json().await
            .map_err(|e| self.connection_error("Customer lookup", e))?;

        if let Some(customer) = found.data.into_iter().next() {
            return Ok(customer.id);
        }

        let payload = CustomerPayload {
            name: name.to_string(),
            email: email.to_string(),
            cpf_cnpj: cpf.to_string(),
            mobile_phone: phone.to_string(),
        };

        let res = self.client
            .post(format!("{}/customers", self.base_url))
            .header("access_token", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.connection_error("Customer creation", e))?;

        let res = self.check(res, "Customer creation").await?;
        let created: CustomerResponse = res.json().await
            .map_err(|e| self.connection_error("Customer creation", e))?;

        Ok(created.id)
    }

    async fn create_charge(&self, request: &NewChargeRequest) -> Result<GatewayCharge, AppError> {
        // The gateway wire format wants decimal currency; cents stay the
        // unit everywhere inside this service.
        let payload = ChargePayload {
            customer: request.customer_id.clone(),
            billing_type: request.billing_type.clone(),
            value: request.amount_cents as f64 / 100.0,
            due_date: request.due_date.format("%Y-%m-%d").to_string(),
            description: request.description.clone(),
            external_reference: request.external_reference.clone(),
        };

        let res = self.client
            .post(format!("{}/payments", self.base_url))
            .header("access_token", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.connection_error("Charge creation", e))?;

        let res = self.check(res, "Charge creation").await?;
        let charge: ChargeResponse = res.json().await
            .map_err(|e| self.connection_error("Charge creation", e))?;

        Ok(GatewayCharge {
            id: charge.id,
            status: charge.status,
            slip_url: charge.bank_slip_url.or(charge.invoice_url),
        })
    }

    async fn get_pix_qr_code(&self, charge_id: &str) -> Result<PixQrCode, AppError> {
        let res = self.client
            .get(format!("{}/payments/{}/pixQrCode", self.base_url, charge_id))
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(|e| self.connection_error("PIX QR fetch", e))?;

        let res = self.check(res, "PIX QR fetch").await?;
        let qr: PixQrCodeResponse = res.json().await
            .map_err(|e| self.connection_error("PIX QR fetch", e))?;

        Ok(PixQrCode {
            payload: qr.payload,
            encoded_image: qr.encoded_image,
        })
    }

    async fn get_payment(&self, charge_id: &str) -> Result<GatewayPaymentStatus, AppError> {
        let res = self.client
            .get(format!("{}/payments/{}", self.base_url, charge_id))
            .header("access_token", &self.api_key)
            .send()
            .await
            .map_err(|e| self.connection_error("Payment poll", e))?;

        let res = self.check(res, "Payment poll").await?;
        let remote: PaymentStatusResponse = res.json().await
            .map_err(|e| self.connection_error("Payment poll", e))?;

        Ok(GatewayPaymentStatus {
            status: remote.status,
            payment_date: parse_gateway_date(remote.payment_date.as_deref()),
        })
    }
}
