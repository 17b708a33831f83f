use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    accounts::{
        dto::{ProfilePatch, RegisterRequest},
        model::{GoodsCategory, ProfileField, Role},
    },
    error::FieldErrors,
};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const USERNAME_WHITESPACE: &str = "username can't contain any whitespace(s)";
pub const PASSWORD_MISMATCH: &str =
    "password confirmation field didn't match with the password field";

const EMAIL_MAX_LEN: usize = 254;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Blank and length checks shared by every text field.
fn check_text(errors: &mut FieldErrors, key: &str, value: &str, max: usize) -> bool {
    if value.trim().is_empty() {
        errors.add(key, BLANK);
        return false;
    }
    if value.chars().count() > max {
        errors.add(key, too_long(max));
        return false;
    }
    true
}

fn check_username(errors: &mut FieldErrors, value: &str) {
    if check_text(errors, "username", value, ProfileField::Username.max_len())
        && value.chars().any(char::is_whitespace)
    {
        errors.add("username", USERNAME_WHITESPACE);
    }
}

/// Field checks for a registration; cross-record uniqueness is not covered here.
pub fn registration(req: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match req.email.as_deref() {
        None => errors.add("email", REQUIRED),
        Some(email) => {
            let email = normalize_email(email);
            if check_text(&mut errors, "email", &email, EMAIL_MAX_LEN) && !is_valid_email(&email)
            {
                errors.add("email", "Enter a valid email address.");
            }
        }
    }

    match req.username.as_deref() {
        None => errors.add("username", REQUIRED),
        Some(username) => check_username(&mut errors, username),
    }

    match req.role.as_deref() {
        None => errors.add("role", REQUIRED),
        Some(role) if role.trim().is_empty() => errors.add("role", BLANK),
        Some(role) => {
            if role.parse::<Role>().is_err() {
                errors.add("role", format!("\"{role}\" is not a valid choice."));
            }
        }
    }

    match req.password.as_deref() {
        None => errors.add("password", REQUIRED),
        Some("") => errors.add("password", BLANK),
        Some(_) => {}
    }
    match req.password_confirmation.as_deref() {
        None => errors.add("passwordConfirmation", REQUIRED),
        Some("") => errors.add("passwordConfirmation", BLANK),
        Some(confirmation) => {
            if let Some(p) = req.password.as_deref() {
                if !p.is_empty() && p != confirmation {
                    errors.add("passwordConfirmation", PASSWORD_MISMATCH);
                }
            }
        }
    }

    errors
}

/// Field checks for a profile patch, run before any change is applied.
pub fn patch(p: &ProfilePatch) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(username) = p.username.as_deref() {
        check_username(&mut errors, username);
    }

    match (p.password.as_deref(), p.password_confirmation.as_deref()) {
        (None, None) => {}
        (Some(_), None) => errors.add("passwordConfirmation", REQUIRED),
        (None, Some(_)) => errors.add("password", REQUIRED),
        (Some(password), Some(confirmation)) => {
            if password.is_empty() {
                errors.add("password", BLANK);
            }
            if confirmation.is_empty() {
                errors.add("passwordConfirmation", BLANK);
            }
        }
    }

    let text_fields = [
        (ProfileField::NamaLengkap, &p.nama_lengkap),
        (ProfileField::NomorInduk, &p.nomor_induk),
        (ProfileField::Angkatan, &p.angkatan),
        (ProfileField::Jurusan, &p.jurusan),
        (ProfileField::NamaPanggilan, &p.nama_panggilan),
        (ProfileField::NomorHp, &p.nomor_hp),
        (ProfileField::NamaToko, &p.nama_toko),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value.as_deref() {
            check_text(&mut errors, field.key(), value, field.max_len());
        }
    }

    if let Some(category) = p.tipe_dagangan.as_deref() {
        let key = ProfileField::TipeDagangan.key();
        if category.trim().is_empty() {
            errors.add(key, BLANK);
        } else if category.parse::<GoodsCategory>().is_err() {
            errors.add(key, format!("\"{category}\" is not a valid choice."));
        }
    }

    errors
}
