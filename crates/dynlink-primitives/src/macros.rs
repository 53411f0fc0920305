#[macro_export]
macro_rules! scalar_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Blob,
                Blob,
                label = "Blob",
                is_numeric_value = false,
                has_canonical_text = false,
                is_keyable = false
            ),
            (
                Bool,
                Bool,
                label = "Bool",
                is_numeric_value = false,
                has_canonical_text = true,
                is_keyable = false
            ),
            (
                Float64,
                Numeric,
                label = "Float64",
                is_numeric_value = true,
                has_canonical_text = true,
                is_keyable = false
            ),
            (
                Int,
                Numeric,
                label = "Int",
                is_numeric_value = true,
                has_canonical_text = true,
                is_keyable = true
            ),
            (
                Text,
                Textual,
                label = "Text",
                is_numeric_value = false,
                has_canonical_text = true,
                is_keyable = true
            ),
            (
                Timestamp,
                Numeric,
                label = "Timestamp",
                is_numeric_value = true,
                has_canonical_text = true,
                is_keyable = true
            ),
            (
                Uint,
                Numeric,
                label = "Uint",
                is_numeric_value = true,
                has_canonical_text = true,
                is_keyable = true
            ),
            (
                Ulid,
                Identifier,
                label = "Ulid",
                is_numeric_value = false,
                has_canonical_text = true,
                is_keyable = true
            ),
        }
    };
}

#[macro_export]
macro_rules! scalar_kind_registry {
    ($macro:ident) => {
        $crate::scalar_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::scalar_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($scalar:ident, $family:ident, label = $label:literal, is_numeric_value = $is_numeric:expr, has_canonical_text = $has_text:expr, is_keyable = $is_keyable:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::ScalarKind::$scalar => $crate::ScalarMetadata {
                    family: $crate::ScalarFamily::$family,
                    label: $label,
                    is_numeric_value: $is_numeric,
                    has_canonical_text: $has_text,
                    is_keyable: $is_keyable,
                },
            )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($scalar:ident, $family:ident, label = $label:literal, is_numeric_value = $is_numeric:expr, has_canonical_text = $has_text:expr, is_keyable = $is_keyable:expr) ),* $(,)? ) => {
        [ $( $crate::ScalarKind::$scalar ),* ]
    };
}
