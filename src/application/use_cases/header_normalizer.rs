// ============================================================
// HEADER NORMALIZER
// ============================================================
// Map arbitrary source column names (English/Spanish, spacing and
// accent variants) onto canonical field names. Static lookup, not a
// fuzzy matcher: unmapped vocabulary passes through unchanged so the
// mapping UI can still surface it.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Exact synonyms, keyed by the normalized form of the source header.
/// Ordered list kept as data so the table stays easy to audit and extend.
static SYNONYMS: &[(&[&str], &str)] = &[
    (&["nombre", "nombres", "firstname", "primernombre"], "firstName"),
    (&["apellido", "apellidos", "lastname"], "lastName"),
    (&["nombrecompleto", "fullname", "name"], "name"),
    (
        &[
            "correo",
            "correoelectronico",
            "correoelectrónico",
            "email",
            "mail",
            "emailaddress",
        ],
        "email",
    ),
    (
        &["codigopais", "codigopaís", "códigopaís", "countrycode", "phonecountry"],
        "phoneCountry",
    ),
    (
        &[
            "telefono",
            "teléfono",
            "celular",
            "movil",
            "móvil",
            "phone",
            "phonenumber",
            "whatsapp",
        ],
        "phoneNumber",
    ),
    (
        &["idnumber", "identificacion", "identificación", "documento", "dni"],
        "idNumber",
    ),
    (&["direccion", "dirección", "address", "domicilio"], "address"),
    (&["ciudad", "city"], "city"),
    (&["provincia", "province", "state"], "province"),
    (
        &[
            "instruccionesdeentrega",
            "instruccionesentrega",
            "deliveryinstructions",
            "referencia",
            "referencias",
        ],
        "deliveryInstructions",
    ),
    (&["marca", "marcas", "brand", "brands", "linea", "línea"], "brand"),
    (&["estado", "status", "estatus", "etapa"], "status"),
    (&["origen", "fuente", "source"], "source"),
    (
        &["nota", "notas", "notes", "observaciones", "comentarios"],
        "notes",
    ),
    (
        &[
            "customerid",
            "clienteid",
            "idcliente",
            "codigocliente",
            "numerocliente",
        ],
        "customerId",
    ),
    (
        &["monto", "importe", "valor", "total", "amount", "precio"],
        "amount",
    ),
    (
        &["fecha", "date", "fechaventa", "fechadeventa", "saledate"],
        "date",
    ),
];

static SYNONYM_INDEX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (variants, canonical) in SYNONYMS {
        for variant in *variants {
            index.insert(*variant, *canonical);
        }
    }
    index
});

/// Normalize one header to its canonical field name, or to its camelCase
/// form when no synonym matches.
pub fn normalize_header(header: &str) -> String {
    let key = normalize_key(header);

    if let Some(canonical) = SYNONYM_INDEX.get(key.as_str()) {
        return (*canonical).to_string();
    }

    // Phone-like headers: country variants vs the number itself
    if key.contains("phone") || key.contains("telefono") || key.contains("teléfono") || key.contains("celular") {
        if key.contains("country")
            || key.contains("pais")
            || key.contains("país")
            || key.contains("codigo")
            || key.contains("código")
        {
            return "phoneCountry".to_string();
        }
        return "phoneNumber".to_string();
    }

    // Id-like headers
    if key.contains("cedula") || key.contains("cédula") || key.contains("pasaporte") {
        return "idNumber".to_string();
    }

    to_camel_case(header)
}

/// Normalize a whole header row, index-aligned with the input.
pub fn normalize_headers(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h)).collect()
}

/// Lower-case and strip everything that is not alphanumeric. Used both for
/// synonym lookup and for the mapping resolver's case/punctuation-insensitive
/// comparisons.
pub fn normalize_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// camelCase passthrough for headers without a synonym match.
fn to_camel_case(header: &str) -> String {
    let mut result = String::with_capacity(header.len());
    let mut first_word = true;

    for word in header.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        let lower = word.to_lowercase();
        if first_word {
            result.push_str(&lower);
            first_word = false;
        } else {
            let mut chars = lower.chars();
            if let Some(c) = chars.next() {
                result.extend(c.to_uppercase());
                result.push_str(chars.as_str());
            }
        }
    }

    result
}
