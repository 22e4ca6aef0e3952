use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Brazilian CPF, stored digits-only. Validated with the standard
/// mod-11 check-digit scheme at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != 11 {
            return Err("CPF must contain 11 digits".to_string());
        }

        let nums: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

        if nums.iter().all(|&d| d == nums[0]) {
            return Err("CPF cannot be a repeated digit sequence".to_string());
        }

        let check = |len: usize| -> u32 {
            let sum: u32 = nums[..len]
                .iter()
                .enumerate()
                .map(|(i, &d)| d * (len as u32 + 1 - i as u32))
                .sum();
            let rem = (sum * 10) % 11;
            if rem == 10 { 0 } else { rem }
        };

        if check(9) != nums[9] || check(10) != nums[10] {
            return Err("CPF check digits are invalid".to_string());
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `000.000.000-00` display form.
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.0[0..3],
            &self.0[3..6],
            &self.0[6..9],
            &self.0[9..11]
        )
    }
}

/// Amount in integer minor-currency units (centavos). Never a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Result<Self, String> {
        if cents < 0 {
            return Err("amount cannot be negative".to_string());
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `5000` -> `"R$ 50,00"`, thousands grouped with dots.
    pub fn format_brl(&self) -> String {
        let reais = self.0 / 100;
        let cents = self.0 % 100;

        let digits = reais.to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        format!("R$ {},{:02}", grouped, cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value = raw.trim().to_lowercase();

        let Some((local, domain)) = value.split_once('@') else {
            return Err("email must contain @".to_string());
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
            return Err("email address is malformed".to_string());
        }
        if value.contains(char::is_whitespace) {
            return Err("email cannot contain whitespace".to_string());
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Brazilian phone number, digits-only (10 digits fixed, 11 mobile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        if digits.len() != 10 && digits.len() != 11 {
            return Err("phone must contain 10 or 11 digits".to_string());
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    pub fn parse(date: NaiveDate) -> Result<Self, String> {
        let today = Utc::now().date_naive();

        if date >= today {
            return Err("birth date must be in the past".to_string());
        }
        if today.year() - date.year() > 130 {
            return Err("birth date is too far in the past".to_string());
        }

        Ok(Self(date))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gender(String);

impl Gender {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value = raw.trim().to_uppercase();
        match value.as_str() {
            "MALE" | "FEMALE" | "OTHER" => Ok(Self(value)),
            _ => Err("gender must be one of MALE, FEMALE, OTHER".to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value = raw.trim().to_string();

        if value.len() < 3 || value.len() > 120 {
            return Err("name must be between 3 and 120 characters".to_string());
        }
        if value.split_whitespace().count() < 2 {
            return Err("name must include at least first and last name".to_string());
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
