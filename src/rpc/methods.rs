//! Remotely invocable dialog procedures
//!
//! Each entry names the procedure, documents it, declares its parameters
//! (with defaults) and points at the handler that forwards to the coordinator.

use super::params::Args;
use crate::dialog::DialogCoordinator;
use crate::errors::RpcError;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;

/// How an absent parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Required,
    Optional,
    Int(i32),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub default: ParamDefault,
}

type Handler = fn(&DialogCoordinator, &Args) -> Result<Value, RpcError>;

pub struct MethodSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub returns: Option<&'static str>,
    pub handler: Handler,
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl MethodSpec {
    /// One-line signature for listings, e.g. `dialogCreateAlert(Title?, Message?)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| match p.default {
                ParamDefault::Required => p.name.to_string(),
                ParamDefault::Optional => format!("{}?", p.name),
                ParamDefault::Int(n) => format!("{}={n}", p.name),
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

const fn required(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        description: None,
        default: ParamDefault::Required,
    }
}

const fn optional(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        description: None,
        default: ParamDefault::Optional,
    }
}

const fn defaulted(name: &'static str, value: i32) -> ParamSpec {
    ParamSpec {
        name,
        description: None,
        default: ParamDefault::Int(value),
    }
}

const PROGRESS_PARAMS: &[ParamSpec] = &[
    optional("Title"),
    optional("Message"),
    defaulted("Maximum progress", 100),
];

/// The full method table
pub static METHODS: &[MethodSpec] = &[
    MethodSpec {
        name: "dialogCreateSpinnerProgress",
        description: "Create a spinner progress dialog.",
        params: PROGRESS_PARAMS,
        returns: None,
        handler: |c, a| {
            c.create_spinner_progress(a.opt_string(0)?, a.opt_string(1)?, a.int(2)?);
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogCreateHorizontalProgress",
        description: "Create a horizontal progress dialog.",
        params: PROGRESS_PARAMS,
        returns: None,
        handler: |c, a| {
            c.create_horizontal_progress(a.opt_string(0)?, a.opt_string(1)?, a.int(2)?);
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogCreateAlert",
        description: "Create alert dialog.",
        params: &[optional("Title"), optional("Message")],
        returns: None,
        handler: |c, a| {
            c.create_alert(a.opt_string(0)?, a.opt_string(1)?);
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogCreateSeekBar",
        description: "Create seek bar dialog.",
        params: &[
            defaulted("Starting value", 50),
            defaulted("Maximum value", 100),
            required("Title"),
            required("Message"),
        ],
        returns: None,
        handler: |c, a| {
            c.create_seek_bar(a.int(0)?, a.int(1)?, a.string(2)?, a.string(3)?);
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogDismiss",
        description: "Dismiss dialog.",
        params: &[],
        returns: None,
        handler: |c, _| {
            c.dismiss();
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogShow",
        description: "Show dialog.",
        params: &[],
        returns: None,
        handler: |c, _| {
            c.show()?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetCurrentProgress",
        description: "Set progress dialog current value.",
        params: &[required("current")],
        returns: None,
        handler: |c, a| {
            c.set_current_progress(a.int(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetMaxProgress",
        description: "Set progress dialog maximum value.",
        params: &[required("max")],
        returns: None,
        handler: |c, a| {
            c.set_max_progress(a.int(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetPositiveButtonText",
        description: "Set alert dialog positive button text.",
        params: &[required("text")],
        returns: None,
        handler: |c, a| {
            c.set_positive_button_text(a.string(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetNegativeButtonText",
        description: "Set alert dialog button text.",
        params: &[required("text")],
        returns: None,
        handler: |c, a| {
            c.set_negative_button_text(a.string(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetNeutralButtonText",
        description: "Set alert dialog button text.",
        params: &[required("text")],
        returns: None,
        handler: |c, a| {
            c.set_neutral_button_text(a.string(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetItems",
        description: "Set alert dialog list items.",
        params: &[required("items")],
        returns: None,
        handler: |c, a| {
            c.set_items(a.items(0)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetSingleChoiceItems",
        description: "Set dialog single choice items and selected item.",
        params: &[
            required("items"),
            ParamSpec {
                name: "selected",
                description: Some("selected item index"),
                default: ParamDefault::Int(0),
            },
        ],
        returns: None,
        handler: |c, a| {
            // A negative index means nothing is preselected
            let selected = usize::try_from(a.int(1)?).ok();
            c.set_single_choice_items(a.items(0)?, selected)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogSetMultiChoiceItems",
        description: "Set dialog multiple choice items and selection.",
        params: &[
            required("items"),
            ParamSpec {
                name: "selected",
                description: Some("list of selected items"),
                default: ParamDefault::Optional,
            },
        ],
        returns: None,
        handler: |c, a| {
            c.set_multi_choice_items(a.items(0)?, a.indices(1)?)?;
            Ok(Value::Null)
        },
    },
    MethodSpec {
        name: "dialogGetResponse",
        description: "Returns dialog response.",
        params: &[],
        returns: Some("Response object"),
        handler: |c, _| Ok(c.get_response()?.to_json()),
    },
    MethodSpec {
        name: "dialogGetSelectedItems",
        description: "This method provides list of items user selected.",
        params: &[],
        returns: Some("Selected items"),
        handler: |c, _| Ok(json!(c.get_selected_items()?)),
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static MethodSpec>> =
    Lazy::new(|| METHODS.iter().map(|m| (m.name, m)).collect());

pub fn lookup(name: &str) -> Option<&'static MethodSpec> {
    INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_unique() {
        assert_eq!(INDEX.len(), METHODS.len());
    }

    #[test]
    fn test_lookup() {
        assert!(lookup("dialogShow").is_some());
        assert!(lookup("dialogshow").is_none());
        assert!(lookup("makeToast").is_none());
    }

    #[test]
    fn test_signature() {
        let spec = lookup("dialogCreateSeekBar").unwrap();
        assert_eq!(
            spec.signature(),
            "dialogCreateSeekBar(Starting value=50, Maximum value=100, Title, Message)"
        );
        assert_eq!(
            lookup("dialogCreateAlert").unwrap().signature(),
            "dialogCreateAlert(Title?, Message?)"
        );
    }
}
