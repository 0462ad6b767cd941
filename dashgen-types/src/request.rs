//! Request bodies sent to the dashboard generation endpoints.
//!
//! Field names serialize as camelCase to match the backend DTOs.

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// Default primary theme color.
pub const DEFAULT_PRIMARY: &str = "#409EFF";
/// Default secondary theme color.
pub const DEFAULT_SECONDARY: &str = "#79BBFF";
/// Default accent theme color.
pub const DEFAULT_ACCENT: &str = "#A0CFFF";

/// Maximum number of components in one dashboard.
pub const MAX_COMPONENTS: usize = 10;

const MAX_PURPOSE_DETAIL: usize = 100;
const MAX_FOCUS_METRICS: usize = 100;
const MAX_CUSTOM_REQUIREMENTS: usize = 200;
const MAX_ADDITIONAL_REQUIREMENTS: usize = 500;

/// Everything the backend needs to generate one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// What the dashboard is for (e.g. `"warehouse"`).
    pub purpose: String,
    /// Scenario details, such as cold-chain shelving or hazardous goods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_detail: Option<String>,
    /// Metrics the dashboard should emphasise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_metrics: Option<String>,
    /// Free-form extra requirements from the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_requirements: Option<String>,
    /// Layout id.
    pub layout: String,
    /// Theme name and colors.
    pub theme: ThemeConfig,
    /// Component ids, in display order.
    pub components: Vec<String>,
    /// Per-component data configuration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_configs: Vec<ComponentConfig>,
    /// Generation options.
    #[serde(default)]
    pub options: GenerationOptions,
    /// Output flavour.
    #[serde(default)]
    pub code_type: CodeType,
}

impl GenerationRequest {
    /// Create a request with default options and no component configs.
    #[must_use]
    pub fn new(
        purpose: impl Into<String>,
        layout: impl Into<String>,
        theme: ThemeConfig,
        components: Vec<String>,
    ) -> Self {
        Self {
            purpose: purpose.into(),
            purpose_detail: None,
            focus_metrics: None,
            custom_requirements: None,
            layout: layout.into(),
            theme,
            components,
            component_configs: Vec::new(),
            options: GenerationOptions::default(),
            code_type: CodeType::default(),
        }
    }

    /// Set the scenario details.
    #[must_use]
    pub fn purpose_detail(mut self, detail: impl Into<String>) -> Self {
        self.purpose_detail = Some(detail.into());
        self
    }

    /// Set the metrics to emphasise.
    #[must_use]
    pub fn focus_metrics(mut self, metrics: impl Into<String>) -> Self {
        self.focus_metrics = Some(metrics.into());
        self
    }

    /// Set free-form extra requirements.
    #[must_use]
    pub fn custom_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.custom_requirements = Some(requirements.into());
        self
    }

    /// Append a per-component configuration.
    #[must_use]
    pub fn component_config(mut self, config: ComponentConfig) -> Self {
        self.component_configs.push(config);
        self
    }

    /// Replace the generation options.
    #[must_use]
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the output flavour.
    #[must_use]
    pub fn code_type(mut self, code_type: CodeType) -> Self {
        self.code_type = code_type;
        self
    }

    /// Check the constraints the backend enforces on this request.
    ///
    /// Lengths are counted in characters, not bytes.
    pub fn validate(&self) -> Result<(), StreamError> {
        require_non_blank("purpose", &self.purpose)?;
        require_non_blank("layout", &self.layout)?;
        require_max_len("purposeDetail", self.purpose_detail.as_deref(), MAX_PURPOSE_DETAIL)?;
        require_max_len("focusMetrics", self.focus_metrics.as_deref(), MAX_FOCUS_METRICS)?;
        require_max_len(
            "customRequirements",
            self.custom_requirements.as_deref(),
            MAX_CUSTOM_REQUIREMENTS,
        )?;
        require_non_blank("theme.name", &self.theme.name)?;

        if self.components.is_empty() || self.components.len() > MAX_COMPONENTS {
            return Err(StreamError::InvalidRequest(format!(
                "components must contain between 1 and {MAX_COMPONENTS} entries, got {}",
                self.components.len()
            )));
        }
        if let Some(idx) = self.components.iter().position(|c| c.trim().is_empty()) {
            return Err(StreamError::InvalidRequest(format!(
                "components[{idx}] must not be blank"
            )));
        }

        require_max_len(
            "options.additionalRequirements",
            Some(&self.options.additional_requirements),
            MAX_ADDITIONAL_REQUIREMENTS,
        )
    }
}

/// Theme name plus its palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Display name of the theme.
    pub name: String,
    /// Palette.
    pub colors: ThemeColors,
}

impl ThemeConfig {
    /// A theme with the default palette.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colors: ThemeColors::default(),
        }
    }
}

/// Theme palette. Background, surface and text are optional overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Primary color.
    pub primary: String,
    /// Secondary color.
    pub secondary: String,
    /// Accent color.
    pub accent: String,
    /// Page background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Card/panel surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    /// Body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.into(),
            secondary: DEFAULT_SECONDARY.into(),
            accent: DEFAULT_ACCENT.into(),
            background: None,
            surface: None,
            text: None,
        }
    }
}

/// Data configuration for a single component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    /// Component id, matching an entry of [`GenerationRequest::components`].
    pub component_id: String,
    /// Component type.
    pub component_type: String,
    /// Description of where the data comes from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Refresh interval in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u32>,
    /// Shape of the data the component renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_structure: Option<DataStructure>,
}

impl ComponentConfig {
    /// A config whose type equals its id, as the wizard builds them.
    #[must_use]
    pub fn for_component(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            component_type: id.clone(),
            component_id: id,
            ..Self::default()
        }
    }
}

/// Data shape for charts, KPI cards and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStructure {
    /// Chart x-axis field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_field: Option<String>,
    /// Chart y-axis field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,
    /// Series field for multi-series charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_field: Option<String>,
    /// Pie chart name field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,
    /// Pie chart value field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    /// KPI title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// KPI unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// KPI comparison: `chain`, `year` or `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
    /// KPI trend: `up`, `down` or `stable`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    /// Table columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnConfig>>,
    /// Whether the table paginates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<bool>,
    /// Rows per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Sample data as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<String>,
    /// Free-form extension schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_schema: Option<serde_json::Value>,
}

/// One table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Field name.
    pub field: String,
    /// Column header.
    pub title: String,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Whether the column sorts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
}

/// Generation options bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    /// Code style.
    pub code_style: CodeStyle,
    /// Whether the layout should be responsive.
    pub responsive: bool,
    /// Whether to embed sample data.
    pub include_data: bool,
    /// Free-text additional requirements.
    pub additional_requirements: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            code_style: CodeStyle::default(),
            responsive: true,
            include_data: true,
            additional_requirements: String::new(),
        }
    }
}

/// Visual code style accepted by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStyle {
    /// Modern look (default).
    #[default]
    Modern,
    /// Minimal look.
    Minimal,
    /// Enterprise look.
    Enterprise,
}

/// Output flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    /// A single self-contained HTML document (default).
    #[default]
    Html,
    /// A Vue single-file component.
    Vue,
}

/// Conversational refinement of an already generated dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    /// Conversation id that keeps the backend's chat memory across rounds.
    pub conversation_id: String,
    /// The complete current HTML document.
    pub current_html: String,
    /// What the user wants changed.
    pub user_request: String,
    /// The configuration the dashboard was first generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_config: Option<GenerationRequest>,
}

impl OptimizeRequest {
    /// Create an optimize request without the original configuration.
    #[must_use]
    pub fn new(
        conversation_id: impl Into<String>,
        current_html: impl Into<String>,
        user_request: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            current_html: current_html.into(),
            user_request: user_request.into(),
            original_config: None,
        }
    }

    /// Attach the original generation request.
    #[must_use]
    pub fn original_config(mut self, config: GenerationRequest) -> Self {
        self.original_config = Some(config);
        self
    }

    /// Check the constraints the backend enforces on this request.
    pub fn validate(&self) -> Result<(), StreamError> {
        require_non_blank("conversationId", &self.conversation_id)?;
        require_non_blank("currentHtml", &self.current_html)?;
        require_non_blank("userRequest", &self.user_request)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), StreamError> {
    if value.trim().is_empty() {
        return Err(StreamError::InvalidRequest(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_max_len(field: &str, value: Option<&str>, max: usize) -> Result<(), StreamError> {
    match value {
        Some(v) if v.chars().count() > max => Err(StreamError::InvalidRequest(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GenerationRequest {
        GenerationRequest::new(
            "warehouse",
            "grid",
            ThemeConfig::named("Ocean"),
            vec!["kpi".into(), "line-chart".into()],
        )
    }

    fn invalid_message(result: Result<(), StreamError>) -> String {
        match result {
            Err(StreamError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got: {other:?}"),
        }
    }

    #[test]
    fn sample_request_is_valid() {
        sample().validate().unwrap();
    }

    #[test]
    fn serializes_camel_case_with_defaults() {
        let req = sample()
            .purpose_detail("cold chain")
            .component_config(ComponentConfig::for_component("kpi"));
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["purposeDetail"], "cold chain");
        assert_eq!(json["theme"]["colors"]["primary"], DEFAULT_PRIMARY);
        assert_eq!(json["componentConfigs"][0]["componentId"], "kpi");
        assert_eq!(json["componentConfigs"][0]["componentType"], "kpi");
        assert_eq!(json["options"]["codeStyle"], "modern");
        assert_eq!(json["options"]["responsive"], true);
        assert_eq!(json["options"]["includeData"], true);
        assert_eq!(json["codeType"], "html");
        assert!(json.get("focusMetrics").is_none());
    }

    #[test]
    fn data_structure_uses_backend_field_names() {
        let ds = DataStructure {
            x_field: Some("date".into()),
            page_size: Some(20),
            ..DataStructure::default()
        };
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["xField"], "date");
        assert_eq!(json["pageSize"], 20);
    }

    #[test]
    fn options_deserialize_with_missing_fields() {
        let opts: GenerationOptions = serde_json::from_str(r#"{"codeStyle":"enterprise"}"#).unwrap();
        assert_eq!(opts.code_style, CodeStyle::Enterprise);
        assert!(opts.responsive);
        assert!(opts.include_data);
    }

    #[test]
    fn unknown_code_style_is_rejected() {
        let res: Result<GenerationOptions, _> = serde_json::from_str(r#"{"codeStyle":"baroque"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn blank_purpose_is_rejected() {
        let mut req = sample();
        req.purpose = "   ".into();
        assert_eq!(invalid_message(req.validate()), "purpose must not be blank");
    }

    #[test]
    fn component_count_is_bounded() {
        let mut req = sample();
        req.components.clear();
        assert!(invalid_message(req.validate()).contains("between 1 and 10"));

        req.components = (0..11).map(|i| format!("c{i}")).collect();
        assert!(invalid_message(req.validate()).contains("got 11"));
    }

    #[test]
    fn blank_component_id_is_rejected() {
        let mut req = sample();
        req.components.push(String::new());
        assert_eq!(invalid_message(req.validate()), "components[2] must not be blank");
    }

    #[test]
    fn length_limits_count_characters() {
        // 100 multi-byte characters are within the limit even though they exceed 100 bytes.
        let req = sample().purpose_detail("冷".repeat(100));
        req.validate().unwrap();

        let req = sample().purpose_detail("冷".repeat(101));
        assert!(invalid_message(req.validate()).starts_with("purposeDetail"));
    }

    #[test]
    fn additional_requirements_limit() {
        let mut req = sample();
        req.options.additional_requirements = "x".repeat(501);
        assert!(invalid_message(req.validate()).starts_with("options.additionalRequirements"));
    }

    #[test]
    fn optimize_request_requires_all_fields() {
        OptimizeRequest::new("conv-1", "<html></html>", "make it dark")
            .validate()
            .unwrap();

        let err = OptimizeRequest::new("conv-1", "", "make it dark").validate();
        assert_eq!(invalid_message(err), "currentHtml must not be blank");
    }

    #[test]
    fn optimize_request_serializes_original_config() {
        let req = OptimizeRequest::new("conv-1", "<html/>", "bigger fonts").original_config(sample());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["conversationId"], "conv-1");
        assert_eq!(json["originalConfig"]["layout"], "grid");
    }
}
