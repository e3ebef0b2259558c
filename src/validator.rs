// SMPP v3.4 field and structural validation rules, centralized so encode and
// decode enforce the same constraints rather than each PDU re-deriving them.

use crate::datatypes::{CommandId, DataCoding, NumericPlanIndicator, TypeOfNumber};
use thiserror::Error;

/// A field failed SMPP v3.4 validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field '{field}' with value '{value}' violates rule: {rule}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub rule: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, value: impl Into<String>, rule: &'static str) -> Self {
        ValidationError {
            field,
            value: value.into(),
            rule,
        }
    }
}

/// The role an address plays in a PDU, used to disambiguate error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    Source,
    Destination,
    Esme,
}

impl AddressRole {
    fn field_name(self) -> &'static str {
        match self {
            AddressRole::Source => "source_addr",
            AddressRole::Destination => "destination_addr",
            AddressRole::Esme => "addr",
        }
    }
}

/// `system_id` must be non-empty, under 16 octets, and restricted to a
/// conservative identifier character set.
pub fn validate_system_id(system_id: &str) -> Result<(), ValidationError> {
    if system_id.is_empty() {
        return Err(ValidationError::new(
            "system_id",
            system_id,
            "must not be empty",
        ));
    }
    if system_id.len() >= 16 {
        return Err(ValidationError::new(
            "system_id",
            system_id,
            "must be fewer than 16 octets",
        ));
    }
    if !system_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return Err(ValidationError::new(
            "system_id",
            system_id,
            "must match [A-Za-z0-9_]",
        ));
    }
    Ok(())
}

/// `password` must be under 9 octets and printable if present.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() >= 9 {
        return Err(ValidationError::new(
            "password",
            password,
            "must be fewer than 9 octets",
        ));
    }
    if !password.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(ValidationError::new(
            "password",
            password,
            "must be printable ASCII",
        ));
    }
    Ok(())
}

/// Cross-field address validation: length, TON-specific charset, and the
/// TON/NPI value ranges SMPP v3.4 defines.
pub fn validate_address(
    addr: &str,
    ton: TypeOfNumber,
    npi: NumericPlanIndicator,
    role: AddressRole,
) -> Result<(), ValidationError> {
    let field = role.field_name();

    if addr.len() > 20 {
        return Err(ValidationError::new(field, addr, "must be at most 20 octets"));
    }

    match ton {
        TypeOfNumber::International if npi == NumericPlanIndicator::Isdn => {
            if !addr.is_empty() && !addr.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ValidationError::new(
                    field,
                    addr,
                    "international ISDN addresses must contain digits only",
                ));
            }
        }
        TypeOfNumber::Alphanumeric => {
            if !addr
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b' ')
            {
                return Err(ValidationError::new(
                    field,
                    addr,
                    "alphanumeric addresses must match [A-Za-z0-9 ]+",
                ));
            }
        }
        _ => {}
    }

    Ok(())
}

/// `service_type` must be at most 5 octets of printable ASCII.
pub fn validate_service_type(service_type: &str) -> Result<(), ValidationError> {
    if service_type.len() > 5 {
        return Err(ValidationError::new(
            "service_type",
            service_type,
            "must be at most 5 octets",
        ));
    }
    if !service_type.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(ValidationError::new(
            "service_type",
            service_type,
            "must be printable ASCII",
        ));
    }
    Ok(())
}

/// Whether `data_coding` is one of the narrow-alphabet schemes limited to a
/// 140 octet short_message, per SMPP v3.4's GSM 7-bit / UCS-2 constraints.
fn is_narrow_alphabet(data_coding: DataCoding) -> bool {
    matches!(
        data_coding,
        DataCoding::SmscDefault
            | DataCoding::Ucs2
            | DataCoding::Gsm7BitWithClass(_)
            | DataCoding::Ucs2WithClass(_)
    )
}

/// `short_message`/`message_payload` length: overall 255 octet ceiling, with
/// GSM-7 and UCS-2 payloads further limited to 140 octets.
pub fn validate_message_length(
    bytes: &[u8],
    data_coding: DataCoding,
) -> Result<(), ValidationError> {
    if bytes.len() > 255 {
        return Err(ValidationError::new(
            "short_message",
            bytes.len().to_string(),
            "must be at most 255 octets",
        ));
    }
    if is_narrow_alphabet(data_coding) && bytes.len() > 140 {
        return Err(ValidationError::new(
            "short_message",
            bytes.len().to_string(),
            "GSM-7/UCS-2 encoded messages must be at most 140 octets",
        ));
    }
    Ok(())
}

/// `sequence_number` must avoid the reserved 0 and the top bit, leaving the
/// 31-bit space SMPP v3.4 actually allocates.
pub fn validate_sequence_number(sequence_number: u32) -> Result<(), ValidationError> {
    if sequence_number == 0 || sequence_number > 0x7FFF_FFFF {
        return Err(ValidationError::new(
            "sequence_number",
            sequence_number.to_string(),
            "must be in [1, 0x7FFFFFFF]",
        ));
    }
    Ok(())
}

/// `command_id` must decode to a known SMPP v3.4 command.
pub fn validate_command_id(command_id: u32) -> Result<CommandId, ValidationError> {
    CommandId::try_from(command_id).map_err(|_| {
        ValidationError::new("command_id", format!("{command_id:#x}"), "must be a known command_id")
    })
}

/// Structural envelope check shared by every PDU: header length bounds and
/// sequence number range. Field-level checks for the body are left to the
/// PDU's own decoder.
pub fn validate_pdu_structure(
    command_length: u32,
    sequence_number: u32,
) -> Result<(), ValidationError> {
    if !(16..=65536).contains(&command_length) {
        return Err(ValidationError::new(
            "command_length",
            command_length.to_string(),
            "must be in [16, 65536]",
        ));
    }
    validate_sequence_number(sequence_number)
}

/// Per-tag rules for the well-known TLVs a correlating peer is most likely to
/// exchange. Tags without a specific rule are accepted unconditionally so
/// unknown/custom TLVs round-trip untouched.
pub fn validate_tlv(tag: u16, value: &[u8]) -> Result<(), ValidationError> {
    use crate::datatypes::tags;

    match tag {
        tags::RECEIPTED_MESSAGE_ID => {
            if !value.iter().all(|&b| (0x20..=0x7e).contains(&b)) {
                return Err(ValidationError::new(
                    "receipted_message_id",
                    format!("{value:?}"),
                    "must be printable ASCII",
                ));
            }
        }
        tags::MESSAGE_PAYLOAD => {
            if value.len() > 1024 {
                return Err(ValidationError::new(
                    "message_payload",
                    value.len().to_string(),
                    "must be at most 1024 octets",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Interface version: this engine only speaks SMPP v3.4, with v3.3 accepted
/// for bind compatibility.
pub fn validate_bind_interface_version(version: u8) -> Result<(), ValidationError> {
    if version != 0x33 && version != 0x34 {
        return Err(ValidationError::new(
            "interface_version",
            format!("{version:#x}"),
            "must be 0x33 or 0x34",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_id_rejects_empty() {
        assert!(validate_system_id("").is_err());
    }

    #[test]
    fn system_id_rejects_too_long() {
        assert!(validate_system_id("1234567890123456").is_err());
    }

    #[test]
    fn system_id_rejects_bad_chars() {
        assert!(validate_system_id("bad id!").is_err());
        assert!(validate_system_id("good_id_1").is_ok());
    }

    #[test]
    fn password_length_and_charset() {
        assert!(validate_password("123456789").is_err());
        assert!(validate_password("secret12").is_ok());
    }

    #[test]
    fn address_international_isdn_digits_only() {
        assert!(validate_address(
            "1234567890",
            TypeOfNumber::International,
            NumericPlanIndicator::Isdn,
            AddressRole::Destination
        )
        .is_ok());
        assert!(validate_address(
            "12ab",
            TypeOfNumber::International,
            NumericPlanIndicator::Isdn,
            AddressRole::Destination
        )
        .is_err());
    }

    #[test]
    fn address_alphanumeric_charset() {
        assert!(validate_address(
            "SHORTCODE",
            TypeOfNumber::Alphanumeric,
            NumericPlanIndicator::Unknown,
            AddressRole::Source
        )
        .is_ok());
        assert!(validate_address(
            "bad!code",
            TypeOfNumber::Alphanumeric,
            NumericPlanIndicator::Unknown,
            AddressRole::Source
        )
        .is_err());
    }

    #[test]
    fn address_length_cap() {
        let too_long = "1".repeat(21);
        assert!(validate_address(
            &too_long,
            TypeOfNumber::Unknown,
            NumericPlanIndicator::Unknown,
            AddressRole::Source
        )
        .is_err());
    }

    #[test]
    fn message_length_narrow_alphabet_cap() {
        let payload = vec![0u8; 141];
        assert!(validate_message_length(&payload, DataCoding::SmscDefault).is_err());
        assert!(validate_message_length(&payload, DataCoding::Binary).is_ok());
    }

    #[test]
    fn message_length_overall_cap() {
        let payload = vec![0u8; 256];
        assert!(validate_message_length(&payload, DataCoding::Binary).is_err());
    }

    #[test]
    fn sequence_number_reserved_values() {
        assert!(validate_sequence_number(0).is_err());
        assert!(validate_sequence_number(0x8000_0000).is_err());
        assert!(validate_sequence_number(1).is_ok());
    }

    #[test]
    fn pdu_structure_length_bounds() {
        assert!(validate_pdu_structure(15, 1).is_err());
        assert!(validate_pdu_structure(65537, 1).is_err());
        assert!(validate_pdu_structure(16, 1).is_ok());
    }

    #[test]
    fn tlv_receipted_message_id_must_be_printable() {
        assert!(validate_tlv(crate::datatypes::tags::RECEIPTED_MESSAGE_ID, b"abc123").is_ok());
        assert!(validate_tlv(crate::datatypes::tags::RECEIPTED_MESSAGE_ID, &[0x00, 0x01]).is_err());
    }

    #[test]
    fn tlv_message_payload_size_cap() {
        let payload = vec![0u8; 1025];
        assert!(validate_tlv(crate::datatypes::tags::MESSAGE_PAYLOAD, &payload).is_err());
    }

    #[test]
    fn bind_interface_version_range() {
        assert!(validate_bind_interface_version(0x33).is_ok());
        assert!(validate_bind_interface_version(0x34).is_ok());
        assert!(validate_bind_interface_version(0x50).is_err());
    }
}
