use crate::domain::models::values::{BirthDate, Cpf, Email, Gender, Money, PersonName, Phone};
use crate::error::{AppError, FieldError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Identity of a registrant without an account. Every field passes through
/// its value object at construction; the struct is never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestData {
    pub full_name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub cpf: Cpf,
    pub birth_date: BirthDate,
    pub gender: Gender,
}

impl GuestData {
    /// Validates every raw field, collecting form-level errors instead of
    /// failing on the first one.
    pub fn parse(
        full_name: &str,
        email: &str,
        phone: &str,
        cpf: &str,
        birth_date: NaiveDate,
        gender: &str,
    ) -> Result<Self, AppError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let full_name = PersonName::parse(full_name).map_err(|message| {
            errors.push(FieldError { field: "full_name".to_string(), message });
        });
        let email = Email::parse(email).map_err(|message| {
            errors.push(FieldError { field: "email".to_string(), message });
        });
        let phone = Phone::parse(phone).map_err(|message| {
            errors.push(FieldError { field: "phone".to_string(), message });
        });
        let cpf = Cpf::parse(cpf).map_err(|message| {
            errors.push(FieldError { field: "cpf".to_string(), message });
        });
        let birth_date = BirthDate::parse(birth_date).map_err(|message| {
            errors.push(FieldError { field: "birth_date".to_string(), message });
        });
        let gender = Gender::parse(gender).map_err(|message| {
            errors.push(FieldError { field: "gender".to_string(), message });
        });

        if !errors.is_empty() {
            return Err(AppError::ValidationDetails(errors));
        }

        Ok(Self {
            full_name: full_name.unwrap(),
            email: email.unwrap(),
            phone: phone.unwrap(),
            cpf: cpf.unwrap(),
            birth_date: birth_date.unwrap(),
            gender: gender.unwrap(),
        })
    }
}

/// One person's registration for one event category. Carries exactly one of
/// {user_id, guest_*} and snapshots both the category price and the
/// registrant's normalized CPF at creation time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Inscription {
    pub id: String,
    pub event_id: String,
    pub category_id: String,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_cpf: Option<String>,
    pub guest_birth_date: Option<NaiveDate>,
    pub guest_gender: Option<String>,
    pub cpf: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub status: String,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewInscriptionParams {
    pub event_id: String,
    pub category_id: String,
    /// Known member: (user id, profile CPF).
    pub user: Option<(String, Cpf)>,
    pub guest: Option<GuestData>,
    pub amount: Money,
    pub payment_method: String,
}

impl Inscription {
    pub fn new(params: NewInscriptionParams) -> Result<Self, AppError> {
        if params.payment_method != "PIX" && params.payment_method != "CASH" {
            return Err(AppError::Validation(format!(
                "Unknown payment method: {}", params.payment_method
            )));
        }

        let (user_id, guest, cpf) = match (params.user, params.guest) {
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "Inscription cannot carry both a user id and guest data".to_string(),
                ));
            }
            (None, None) => {
                return Err(AppError::Validation(
                    "Inscription requires either a user id or guest data".to_string(),
                ));
            }
            (Some((user_id, cpf)), None) => (Some(user_id), None, cpf),
            (None, Some(guest)) => {
                let cpf = guest.cpf.clone();
                (None, Some(guest), cpf)
            }
        };

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            category_id: params.category_id,
            user_id,
            guest_name: guest.as_ref().map(|g| g.full_name.as_str().to_string()),
            guest_email: guest.as_ref().map(|g| g.email.as_str().to_string()),
            guest_phone: guest.as_ref().map(|g| g.phone.as_str().to_string()),
            guest_cpf: guest.as_ref().map(|g| g.cpf.as_str().to_string()),
            guest_birth_date: guest.as_ref().map(|g| g.birth_date.date()),
            guest_gender: guest.as_ref().map(|g| g.gender.as_str().to_string()),
            cpf: cpf.as_str().to_string(),
            amount_cents: params.amount.cents(),
            payment_method: params.payment_method,
            status: "PENDING".to_string(),
            payment_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    pub fn confirm(&mut self, payment_id: &str) -> Result<(), AppError> {
        if self.status != "PENDING" {
            return Err(AppError::Validation(format!(
                "Cannot confirm inscription in status {}", self.status
            )));
        }
        self.status = "CONFIRMED".to_string();
        self.payment_id = Some(payment_id.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Organizer override for cash payments; the synthesized payment id keeps
    /// an audit trail of who confirmed and when.
    pub fn confirm_manually(&mut self, actor_id: &str) -> Result<(), AppError> {
        let payment_id = format!("MANUAL-{}-{}", actor_id, Utc::now().timestamp());
        self.confirm(&payment_id)
    }

    pub fn cancel(&mut self) -> Result<(), AppError> {
        if self.status != "PENDING" {
            return Err(AppError::Validation(format!(
                "Cannot cancel inscription in status {}", self.status
            )));
        }
        self.status = "CANCELLED".to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn is_pending(&self) -> bool {
        self.status == "PENDING"
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == "CONFIRMED"
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == "CANCELLED"
    }

    pub fn can_cancel(&self) -> bool {
        self.is_pending()
    }

    pub fn is_pix_payment(&self) -> bool {
        self.payment_method == "PIX"
    }

    pub fn is_cash_payment(&self) -> bool {
        self.payment_method == "CASH"
    }

    pub fn participant_name(&self) -> Option<&str> {
        self.guest_name.as_deref()
    }

    pub fn participant_email(&self) -> Option<&str> {
        self.guest_email.as_deref()
    }

    pub fn participant_cpf(&self) -> &str {
        self.guest_cpf.as_deref().unwrap_or(&self.cpf)
    }
}
