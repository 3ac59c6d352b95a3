use securefile_core::{DomainError, ResourceId};

/// A `<resourceType>:<action>[:<resourceId>]` scope.
///
/// Used both to mint resource tokens and to compute the scope a request
/// requires. Components must not contain whitespace, since scope lists are
/// space-separated on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    resource_type: String,
    action: String,
    resource_id: Option<String>,
}

impl Scope {
    pub fn new(resource_type: impl Into<String>, action: impl Into<String>) -> Result<Self, DomainError> {
        let resource_type = resource_type.into();
        let action = action.into();
        check_component("resource type", &resource_type)?;
        check_component("action", &action)?;
        Ok(Self {
            resource_type,
            action,
            resource_id: None,
        })
    }

    /// `<type>:create`
    pub fn create(resource_type: &str) -> Result<Self, DomainError> {
        Self::new(resource_type, "create")
    }

    /// `<type>:read`
    pub fn read(resource_type: &str) -> Result<Self, DomainError> {
        Self::new(resource_type, "read")
    }

    /// Narrow the scope to a single resource.
    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }
}

fn check_component(what: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("scope {what} must not be empty")));
    }
    if value.contains(':') || value.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(format!(
            "scope {what} '{value}' must not contain ':' or whitespace"
        )));
    }
    Ok(())
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.action)?;
        if let Some(id) = &self.resource_id {
            write!(f, ":{id}")?;
        }
        Ok(())
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}
