//! Access control entities: users, groups, roles, tenants
//!
//! All four live under the Configuration screen's "Access Control"
//! accordion; their `All` destinations hang off the server's Configuration
//! root through an `appliance.server` attribute prerequisite.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use stratus_nav::{
    downcast_subject, NavArgs, NavStep, Prerequisite, Registry, StepError, Subject, SubjectRef,
};
use stratus_ui::widgets::{accordion, flash, toolbar, FieldValue, Form};
use stratus_ui::UiSession;

use crate::appliance::{Appliance, Navigatable};
use crate::error::{ModelError, ModelResult};
use crate::tagging;

const ACCORDION: &str = "Access Control";
const FORM_ADD: &str = "[data-testid=\"form-add\"]";
const FORM_SAVE: &str = "[data-testid=\"form-save\"]";

/// Login credential pair used by user records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub principal: String,
    pub secret: String,
}

impl Credential {
    pub fn new(principal: &str, secret: &str) -> Self {
        Self {
            principal: principal.to_string(),
            secret: secret.to_string(),
        }
    }
}

fn user_form() -> Form {
    Form::new("user")
        .text("name", "[data-testid=\"user-name-input\"]")
        .text("userid", "[data-testid=\"user-userid-input\"]")
        .text("password", "[data-testid=\"user-password-input\"]")
        .text("password_verify", "[data-testid=\"user-verify-input\"]")
        .text("email", "[data-testid=\"user-email-input\"]")
        .select("group", "[data-testid=\"user-group-select\"]")
}

/// Sparse update for [`User::update`]; `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub group: Option<String>,
    pub credential: Option<Credential>,
}

/// A console user account.
#[derive(Clone)]
pub struct User {
    pub name: String,
    pub credential: Credential,
    pub email: Option<String>,
    pub group: Option<String>,
    appliance: Arc<Appliance>,
}

impl User {
    pub fn new(appliance: &Arc<Appliance>, name: &str, credential: Credential) -> Self {
        Self {
            name: name.to_string(),
            credential,
            email: None,
            group: None,
            appliance: Arc::clone(appliance),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    fn form_values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut values = vec![
            ("name", self.name.as_str().into()),
            ("userid", self.credential.principal.as_str().into()),
            ("password", self.credential.secret.as_str().into()),
            ("password_verify", self.credential.secret.as_str().into()),
        ];
        if let Some(email) = &self.email {
            values.push(("email", email.as_str().into()));
        }
        if let Some(group) = &self.group {
            values.push(("group", FieldValue::Choice(group.clone())));
        }
        values
    }

    pub fn create(&self) -> ModelResult<()> {
        info!(user = %self.name, "creating user");
        self.navigate_to("Add")?;
        user_form().fill_and(self.appliance.ui(), &self.form_values(), FORM_ADD)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("User \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn update(&self, updates: &UserUpdate) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let mut values: Vec<(&str, FieldValue)> = Vec::new();
        if let Some(credential) = &updates.credential {
            values.push(("userid", credential.principal.as_str().into()));
            values.push(("password", credential.secret.as_str().into()));
            values.push(("password_verify", credential.secret.as_str().into()));
        }
        if let Some(name) = &updates.name {
            values.push(("name", name.as_str().into()));
        }
        if let Some(email) = &updates.email {
            values.push(("email", email.as_str().into()));
        }
        if let Some(group) = &updates.group {
            values.push(("group", FieldValue::Choice(group.clone())));
        }
        user_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        let saved = updates.name.as_deref().unwrap_or(&self.name);
        flash::assert_success(self.appliance.ui(), &format!("User \"{saved}\" was saved"))?;
        Ok(())
    }

    /// Copy this user to a new one named `<name>copy`.
    pub fn copy(&self) -> ModelResult<User> {
        self.navigate_to("Details")?;
        toolbar::select(self.appliance.ui(), "Configuration", "Copy this User to a new User")?;
        let copy = User::new(
            &self.appliance,
            &format!("{}copy", self.name),
            self.credential.clone(),
        );
        user_form().fill_and(
            self.appliance.ui(),
            &[
                ("name", copy.name.as_str().into()),
                ("userid", copy.credential.principal.as_str().into()),
                ("password", copy.credential.secret.as_str().into()),
                ("password_verify", copy.credential.secret.as_str().into()),
            ],
            FORM_ADD,
        )?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("User \"{}\" was saved", copy.name),
        )?;
        Ok(copy)
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("Details")?;
        toolbar::select_confirm(self.appliance.ui(), "Configuration", "Delete this User")?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("EVM User \"{}\": Delete successful", self.name),
        )?;
        Ok(())
    }

    pub fn edit_tags(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "User")?;
        tagging::assign(self.appliance.ui(), category, value)?;
        Ok(())
    }

    pub fn remove_tag(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "User")?;
        tagging::unassign(self.appliance.ui(), category, value)?;
        Ok(())
    }

    /// Whether the user shows up in the UI at all; a Details probe that
    /// treats "not there" as `false` and anything else as a real failure.
    pub fn exists(&self) -> ModelResult<bool> {
        match self.navigate_to("Details") {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = ModelError::from(err);
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}

impl Subject for User {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["User"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for User {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

fn group_form() -> Form {
    Form::new("group")
        .text("description", "[data-testid=\"group-description-input\"]")
        .select("role", "[data-testid=\"group-role-select\"]")
        .select("tenant", "[data-testid=\"group-tenant-select\"]")
}

/// An access-control group binding users to a role within a tenant.
#[derive(Clone)]
pub struct Group {
    pub description: String,
    pub role: String,
    pub tenant: String,
    appliance: Arc<Appliance>,
}

impl Group {
    pub fn new(appliance: &Arc<Appliance>, description: &str, role: &str) -> Self {
        Self {
            description: description.to_string(),
            role: role.to_string(),
            tenant: "My Company".to_string(),
            appliance: Arc::clone(appliance),
        }
    }

    pub fn in_tenant(mut self, tenant: &str) -> Self {
        self.tenant = tenant.to_string();
        self
    }

    pub fn create(&self) -> ModelResult<()> {
        info!(group = %self.description, "creating group");
        self.navigate_to("Add")?;
        group_form().fill_and(
            self.appliance.ui(),
            &[
                ("description", self.description.as_str().into()),
                ("role", FieldValue::Choice(self.role.clone())),
                ("tenant", FieldValue::Choice(self.tenant.clone())),
            ],
            FORM_ADD,
        )?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Group \"{}\" was saved", self.description),
        )?;
        Ok(())
    }

    pub fn update(
        &self,
        description: Option<&str>,
        role: Option<&str>,
        tenant: Option<&str>,
    ) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let mut values: Vec<(&str, FieldValue)> = Vec::new();
        if let Some(description) = description {
            values.push(("description", description.into()));
        }
        if let Some(role) = role {
            values.push(("role", FieldValue::Choice(role.to_string())));
        }
        if let Some(tenant) = tenant {
            values.push(("tenant", FieldValue::Choice(tenant.to_string())));
        }
        group_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        let saved = description.unwrap_or(&self.description);
        flash::assert_success(self.appliance.ui(), &format!("Group \"{saved}\" was saved"))?;
        Ok(())
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("Details")?;
        toolbar::select_confirm(self.appliance.ui(), "Configuration", "Delete this Group")?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("EVM Group \"{}\": Delete successful", self.description),
        )?;
        Ok(())
    }

    pub fn edit_tags(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "Group")?;
        tagging::assign(self.appliance.ui(), category, value)?;
        Ok(())
    }

    pub fn remove_tag(&self, category: &str, value: &str) -> ModelResult<()> {
        self.navigate_to("Details")?;
        tagging::open_tag_editor(self.appliance.ui(), "Group")?;
        tagging::unassign(self.appliance.ui(), category, value)?;
        Ok(())
    }

    pub fn exists(&self) -> ModelResult<bool> {
        match self.navigate_to("Details") {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = ModelError::from(err);
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Reorder the group lookup sequence; positions are 1-based top to
    /// bottom.
    pub fn set_lookup_order(appliance: &Arc<Appliance>, order: &[&str]) -> ModelResult<()> {
        let probe = Group::new(appliance, "", "");
        probe.navigate_to("EditGroupSequence")?;
        for (position, name) in order.iter().enumerate() {
            appliance.ui().fill(
                &format!("[data-seq-row=\"{name}\"]"),
                &(position + 1).to_string(),
            )?;
        }
        appliance.ui().click(FORM_SAVE)?;
        flash::assert_success(appliance.ui(), "Group Order was saved")?;
        Ok(())
    }
}

impl Subject for Group {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Group"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.description.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for Group {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

fn role_form() -> Form {
    Form::new("role")
        .text("name", "[data-testid=\"role-name-input\"]")
        .select("vm_restriction", "[data-testid=\"role-vm-restriction-select\"]")
}

/// A product-feature role assignable to groups.
#[derive(Clone)]
pub struct Role {
    pub name: String,
    pub vm_restriction: Option<String>,
    appliance: Arc<Appliance>,
}

impl Role {
    pub fn new(appliance: &Arc<Appliance>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            vm_restriction: None,
            appliance: Arc::clone(appliance),
        }
    }

    pub fn with_vm_restriction(mut self, restriction: &str) -> Self {
        self.vm_restriction = Some(restriction.to_string());
        self
    }

    fn form_values(&self) -> Vec<(&'static str, FieldValue)> {
        let mut values = vec![("name", FieldValue::Text(self.name.clone()))];
        if let Some(restriction) = &self.vm_restriction {
            values.push(("vm_restriction", FieldValue::Choice(restriction.clone())));
        }
        values
    }

    pub fn create(&self) -> ModelResult<()> {
        self.navigate_to("Add")?;
        role_form().fill_and(self.appliance.ui(), &self.form_values(), FORM_ADD)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Role \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn update(&self, name: Option<&str>, vm_restriction: Option<&str>) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let mut values: Vec<(&str, FieldValue)> = Vec::new();
        if let Some(name) = name {
            values.push(("name", name.into()));
        }
        if let Some(restriction) = vm_restriction {
            values.push(("vm_restriction", FieldValue::Choice(restriction.to_string())));
        }
        role_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        let saved = name.unwrap_or(&self.name);
        flash::assert_success(self.appliance.ui(), &format!("Role \"{saved}\" was saved"))?;
        Ok(())
    }

    pub fn copy(&self, name: Option<&str>) -> ModelResult<Role> {
        self.navigate_to("Details")?;
        toolbar::select(self.appliance.ui(), "Configuration", "Copy this Role to a new Role")?;
        let copy = Role::new(
            &self.appliance,
            &name.map(str::to_string).unwrap_or_else(|| format!("{}copy", self.name)),
        );
        role_form().fill_and(self.appliance.ui(), &[("name", copy.name.as_str().into())], FORM_ADD)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Role \"{}\" was saved", copy.name),
        )?;
        Ok(copy)
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("Details")?;
        toolbar::select_confirm(self.appliance.ui(), "Configuration", "Delete this Role")?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Role \"{}\": Delete successful", self.name),
        )?;
        Ok(())
    }
}

impl Subject for Role {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Role"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for Role {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

fn tenant_form() -> Form {
    Form::new("tenant")
        .text("name", "[data-testid=\"tenant-name-input\"]")
        .text("description", "[data-testid=\"tenant-description-input\"]")
}

fn quota_form() -> Form {
    Form::new("quota")
        .checkbox("cpu_cb", "[data-testid=\"quota-cpu-check\"]")
        .text("cpu", "[data-testid=\"quota-cpu-input\"]")
        .checkbox("memory_cb", "[data-testid=\"quota-memory-check\"]")
        .text("memory", "[data-testid=\"quota-memory-input\"]")
        .checkbox("storage_cb", "[data-testid=\"quota-storage-check\"]")
        .text("storage", "[data-testid=\"quota-storage-input\"]")
        .checkbox("vm_cb", "[data-testid=\"quota-vm-check\"]")
        .text("vm", "[data-testid=\"quota-vm-input\"]")
}

/// Quota values for [`Tenant::set_quota`]; `None` entries are untouched.
#[derive(Debug, Clone, Default)]
pub struct TenantQuota {
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub storage: Option<String>,
    pub vm: Option<String>,
}

/// A tenant in the hierarchy under the root "My Company" tenant.
#[derive(Clone)]
pub struct Tenant {
    pub name: String,
    pub description: String,
    parent: Option<Box<Tenant>>,
    is_root: bool,
    appliance: Arc<Appliance>,
}

impl Tenant {
    pub fn new(appliance: &Arc<Appliance>, name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parent: None,
            is_root: false,
            appliance: Arc::clone(appliance),
        }
    }

    /// The root "My Company" tenant. It always exists and cannot be created
    /// or re-parented.
    pub fn root(appliance: &Arc<Appliance>) -> Self {
        Self {
            name: "My Company".to_string(),
            description: String::new(),
            parent: None,
            is_root: true,
            appliance: Arc::clone(appliance),
        }
    }

    pub fn under(mut self, parent: Tenant) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Effective parent: the root tenant when none was set explicitly.
    pub fn parent_tenant(&self) -> Option<Tenant> {
        if self.is_root {
            return None;
        }
        Some(
            self.parent
                .as_deref()
                .cloned()
                .unwrap_or_else(|| Tenant::root(&self.appliance)),
        )
    }

    /// Tree path from the root tenant down to this one.
    pub fn tree_path(&self) -> Vec<String> {
        match self.parent_tenant() {
            Some(parent) => {
                let mut path = parent.tree_path();
                path.push(self.name.clone());
                path
            }
            None => vec![self.name.clone()],
        }
    }

    pub fn create(&self) -> ModelResult<()> {
        if self.is_root {
            return Err(ModelError::Invalid(format!(
                "cannot create the root tenant {}",
                self.name
            )));
        }
        self.navigate_to("Add")?;
        tenant_form().fill_and(
            self.appliance.ui(),
            &[
                ("name", self.name.as_str().into()),
                ("description", self.description.as_str().into()),
            ],
            FORM_ADD,
        )?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Tenant \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn update(&self, name: Option<&str>, description: Option<&str>) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let mut values: Vec<(&str, FieldValue)> = Vec::new();
        if let Some(name) = name {
            values.push(("name", name.into()));
        }
        if let Some(description) = description {
            values.push(("description", description.into()));
        }
        tenant_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        let saved = name.unwrap_or(&self.name);
        flash::assert_success(self.appliance.ui(), &format!("Tenant \"{saved}\" was saved"))?;
        Ok(())
    }

    pub fn delete(&self) -> ModelResult<()> {
        if self.is_root {
            return Err(ModelError::Invalid(format!(
                "cannot delete the root tenant {}",
                self.name
            )));
        }
        self.navigate_to("Details")?;
        toolbar::select_confirm(self.appliance.ui(), "Configuration", "Delete this item")?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Tenant \"{}\": Delete successful", self.name),
        )?;
        Ok(())
    }

    pub fn set_quota(&self, quota: &TenantQuota) -> ModelResult<()> {
        self.navigate_to("ManageQuotas")?;
        let mut values: Vec<(&str, FieldValue)> = Vec::new();
        if let Some(cpu) = &quota.cpu {
            values.push(("cpu_cb", true.into()));
            values.push(("cpu", cpu.as_str().into()));
        }
        if let Some(memory) = &quota.memory {
            values.push(("memory_cb", true.into()));
            values.push(("memory", memory.as_str().into()));
        }
        if let Some(storage) = &quota.storage {
            values.push(("storage_cb", true.into()));
            values.push(("storage", storage.as_str().into()));
        }
        if let Some(vm) = &quota.vm {
            values.push(("vm_cb", true.into()));
            values.push(("vm", vm.as_str().into()));
        }
        quota_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Quotas for Tenant \"{}\" were saved", self.name),
        )?;
        Ok(())
    }

    pub fn exists(&self) -> ModelResult<bool> {
        match self.navigate_to("Details") {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = ModelError::from(err);
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}

impl Subject for Tenant {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Tenant"]
    }

    fn identity(&self) -> Vec<String> {
        self.tree_path()
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "appliance" => Some(Arc::clone(&self.appliance) as SubjectRef),
            "parent_tenant" => self
                .parent_tenant()
                .map(|parent| Arc::new(parent) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for Tenant {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

// --- navigation steps -------------------------------------------------------

fn accordion_all(ui: &dyn UiSession, leaf: &str) -> Result<Value, StepError> {
    accordion::tree(ui, ACCORDION, &[leaf])?;
    Ok(json!({ "page": leaf.to_lowercase() }))
}

struct UserAll;

impl NavStep for UserAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("appliance.server", "Configuration")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let user = downcast_subject::<User>(subject)?;
        accordion_all(user.appliance.ui(), "Users")
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let user = downcast_subject::<User>(subject)?;
        accordion::refresh(user.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct UserAdd;

impl NavStep for UserAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let user = downcast_subject::<User>(subject)?;
        toolbar::select(user.appliance.ui(), "Configuration", "Add a new User")?;
        Ok(json!({ "page": "user-add" }))
    }
}

struct UserDetails;

impl NavStep for UserDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let user = downcast_subject::<User>(subject)?;
        accordion::tree(user.appliance.ui(), ACCORDION, &["Users", &user.name])?;
        Ok(json!({ "page": "user-details", "user": user.name }))
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let user = downcast_subject::<User>(subject)?;
        accordion::refresh(user.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct UserEdit;

impl NavStep for UserEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let user = downcast_subject::<User>(subject)?;
        toolbar::select(user.appliance.ui(), "Configuration", "Edit this User")?;
        Ok(json!({ "page": "user-edit" }))
    }
}

struct GroupAll;

impl NavStep for GroupAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("appliance.server", "Configuration")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let group = downcast_subject::<Group>(subject)?;
        accordion_all(group.appliance.ui(), "Groups")
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let group = downcast_subject::<Group>(subject)?;
        accordion::refresh(group.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct GroupAdd;

impl NavStep for GroupAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let group = downcast_subject::<Group>(subject)?;
        toolbar::select(group.appliance.ui(), "Configuration", "Add a new Group")?;
        Ok(json!({ "page": "group-add" }))
    }
}

struct GroupDetails;

impl NavStep for GroupDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let group = downcast_subject::<Group>(subject)?;
        accordion::tree(group.appliance.ui(), ACCORDION, &["Groups", &group.description])?;
        Ok(json!({ "page": "group-details", "group": group.description }))
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let group = downcast_subject::<Group>(subject)?;
        accordion::refresh(group.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

/// Lookup order of groups is edited from the grid, not a single group's
/// Details, so this hangs off `All`.
struct GroupEditSequence;

impl NavStep for GroupEditSequence {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let group = downcast_subject::<Group>(subject)?;
        toolbar::select(
            group.appliance.ui(),
            "Configuration",
            "Edit Sequence of User Groups",
        )?;
        Ok(json!({ "page": "group-sequence" }))
    }
}

struct GroupEdit;

impl NavStep for GroupEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let group = downcast_subject::<Group>(subject)?;
        toolbar::select(group.appliance.ui(), "Configuration", "Edit this Group")?;
        Ok(json!({ "page": "group-edit" }))
    }
}

struct RoleAll;

impl NavStep for RoleAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("appliance.server", "Configuration")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<Role>(subject)?;
        accordion_all(role.appliance.ui(), "Roles")
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let role = downcast_subject::<Role>(subject)?;
        accordion::refresh(role.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct RoleAdd;

impl NavStep for RoleAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<Role>(subject)?;
        toolbar::select(role.appliance.ui(), "Configuration", "Add a new Role")?;
        Ok(json!({ "page": "role-add" }))
    }
}

struct RoleDetails;

impl NavStep for RoleDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<Role>(subject)?;
        accordion::tree(role.appliance.ui(), ACCORDION, &["Roles", &role.name])?;
        Ok(json!({ "page": "role-details", "role": role.name }))
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let role = downcast_subject::<Role>(subject)?;
        accordion::refresh(role.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct RoleEdit;

impl NavStep for RoleEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let role = downcast_subject::<Role>(subject)?;
        toolbar::select(role.appliance.ui(), "Configuration", "Edit this Role")?;
        Ok(json!({ "page": "role-edit" }))
    }
}

struct TenantAll;

impl NavStep for TenantAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("appliance.server", "Configuration")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        accordion_all(tenant.appliance.ui(), "Tenants")
    }

    fn reset(&self, subject: &dyn Subject) -> Result<(), StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        accordion::refresh(tenant.appliance.ui(), ACCORDION)?;
        Ok(())
    }
}

struct TenantDetails;

impl NavStep for TenantDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        let tree_path = tenant.tree_path();
        let mut path = vec!["Tenants"];
        path.extend(tree_path.iter().map(String::as_str));
        accordion::tree(tenant.appliance.ui(), ACCORDION, &path)?;
        Ok(json!({ "page": "tenant-details", "tenant": tenant.name }))
    }
}

struct TenantAdd;

impl NavStep for TenantAdd {
    // Children are added from their parent's Details page, so the
    // prerequisite is on a different subject of the same type.
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("parent_tenant", "Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        toolbar::select(
            tenant.appliance.ui(),
            "Configuration",
            "Add child Tenant to this Tenant",
        )?;
        Ok(json!({ "page": "tenant-add" }))
    }
}

struct TenantEdit;

impl NavStep for TenantEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        toolbar::select(tenant.appliance.ui(), "Configuration", "Edit this item")?;
        Ok(json!({ "page": "tenant-edit" }))
    }
}

struct TenantManageQuotas;

impl NavStep for TenantManageQuotas {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tenant = downcast_subject::<Tenant>(subject)?;
        toolbar::select(tenant.appliance.ui(), "Configuration", "Manage Quotas")?;
        Ok(json!({ "page": "tenant-quotas" }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("User", "All", UserAll);
    registry.register("User", "Add", UserAdd);
    registry.register("User", "Details", UserDetails);
    registry.register("User", "Edit", UserEdit);

    registry.register("Group", "All", GroupAll);
    registry.register("Group", "Add", GroupAdd);
    registry.register("Group", "Details", GroupDetails);
    registry.register("Group", "Edit", GroupEdit);
    registry.register("Group", "EditGroupSequence", GroupEditSequence);

    registry.register("Role", "All", RoleAll);
    registry.register("Role", "Add", RoleAdd);
    registry.register("Role", "Details", RoleDetails);
    registry.register("Role", "Edit", RoleEdit);

    registry.register("Tenant", "All", TenantAll);
    registry.register("Tenant", "Details", TenantDetails);
    registry.register("Tenant", "Add", TenantAdd);
    registry.register("Tenant", "Edit", TenantEdit);
    registry.register("Tenant", "ManageQuotas", TenantManageQuotas);
}
