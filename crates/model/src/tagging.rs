//! Tag categories, tags, and the shared tag-assignment screen

use std::sync::Arc;

use serde_json::{json, Value};

use stratus_nav::{
    downcast_subject, NavArgs, NavStep, Prerequisite, Registry, StepError, Subject, SubjectRef,
};
use stratus_ui::widgets::{flash, toolbar, Form};
use stratus_ui::{UiResult, UiSession};

use crate::appliance::{Appliance, Navigatable};
use crate::error::ModelResult;

const TAB_CATEGORIES: &str = "[data-testid=\"tab-categories\"]";
const TAB_TAGS: &str = "[data-testid=\"tab-tags\"]";
const CATEGORY_ADD: &str = "[data-testid=\"category-add\"]";
const CATEGORY_EDIT: &str = "[data-testid=\"category-edit\"]";
const TAG_ADD: &str = "[data-testid=\"tag-add\"]";
const FORM_ADD: &str = "[data-testid=\"form-add\"]";
const FORM_SAVE: &str = "[data-testid=\"form-save\"]";

const TAG_CATEGORY_SELECT: &str = "[data-testid=\"tag-category-select\"]";
const TAG_VALUE_SELECT: &str = "[data-testid=\"tag-value-select\"]";
const TAG_SAVE: &str = "[data-testid=\"tag-save\"]";

/// The "Edit 'My Company' Tags" screen, shared by every taggable entity.
/// Callers navigate to the entity's Details page and open the screen through
/// the Policy toolbar before using these.
pub fn assign(session: &dyn UiSession, category: &str, value: &str) -> UiResult<()> {
    session.select_option(TAG_CATEGORY_SELECT, category)?;
    session.select_option(TAG_VALUE_SELECT, value)?;
    session.click(TAG_SAVE)?;
    flash::assert_success(session, "Tag edits were successfully saved")
}

pub fn unassign(session: &dyn UiSession, category: &str, value: &str) -> UiResult<()> {
    session.click(&format!("[data-tag-row=\"{category}:{value}\"]"))?;
    session.click(TAG_SAVE)?;
    flash::assert_success(session, "Tag edits were successfully saved")
}

/// Open the tag-edit screen for whatever Details page is current.
pub(crate) fn open_tag_editor(session: &dyn UiSession, entity: &str) -> UiResult<()> {
    toolbar::select_confirm(
        session,
        "Policy",
        &format!("Edit 'My Company' Tags for this {entity}"),
    )
}

fn category_form() -> Form {
    Form::new("category")
        .text("name", "[data-testid=\"category-name-input\"]")
        .text("display_name", "[data-testid=\"category-display-input\"]")
        .text("description", "[data-testid=\"category-description-input\"]")
}

fn tag_form() -> Form {
    Form::new("tag")
        .text("name", "[data-testid=\"tag-name-input\"]")
        .text("display_name", "[data-testid=\"tag-display-input\"]")
}

/// A tag category under the region settings.
#[derive(Clone)]
pub struct Category {
    pub name: String,
    pub display_name: String,
    pub description: String,
    appliance: Arc<Appliance>,
}

impl Category {
    pub fn new(appliance: &Arc<Appliance>, name: &str, display_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            appliance: Arc::clone(appliance),
        }
    }

    pub fn create(&self) -> ModelResult<()> {
        self.navigate_to("Add")?;
        category_form().fill_and(
            self.appliance.ui(),
            &[
                ("name", self.name.as_str().into()),
                ("display_name", self.display_name.as_str().into()),
                ("description", self.description.as_str().into()),
            ],
            FORM_ADD,
        )?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Category \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn update(&self, display_name: Option<&str>, description: Option<&str>) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let mut values = Vec::new();
        if let Some(display_name) = display_name {
            values.push(("display_name", display_name.into()));
        }
        if let Some(description) = description {
            values.push(("description", description.into()));
        }
        category_form().fill_and(self.appliance.ui(), &values, FORM_SAVE)?;
        flash::assert_success(
            self.appliance.ui(),
            &format!("Category \"{}\" was saved", self.name),
        )?;
        Ok(())
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("All")?;
        let ui = self.appliance.ui();
        ui.accept_alert()?;
        ui.click(&format!("[data-row-action=\"{}:delete\"]", self.name))?;
        flash::assert_success(ui, &format!("Category \"{}\": Delete successful", self.name))?;
        Ok(())
    }
}

impl Subject for Category {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Category"]
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

impl Navigatable for Category {
    fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

/// A tag value inside a category.
#[derive(Clone)]
pub struct Tag {
    pub name: String,
    pub display_name: String,
    pub category: Category,
}

impl Tag {
    pub fn new(category: &Category, name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            category: category.clone(),
        }
    }

    fn appliance_ref(&self) -> &Arc<Appliance> {
        self.category.appliance()
    }

    pub fn create(&self) -> ModelResult<()> {
        self.navigate_to("Add")?;
        let ui = self.appliance_ref().ui();
        tag_form().fill_and(
            ui,
            &[
                ("name", self.name.as_str().into()),
                ("display_name", self.display_name.as_str().into()),
            ],
            FORM_ADD,
        )?;
        flash::assert_success(ui, &format!("Tag \"{}\" was saved", self.name))?;
        Ok(())
    }

    pub fn update(&self, display_name: &str) -> ModelResult<()> {
        self.navigate_to("Edit")?;
        let ui = self.appliance_ref().ui();
        tag_form().fill_and(ui, &[("display_name", display_name.into())], FORM_SAVE)?;
        flash::assert_success(ui, &format!("Tag \"{}\" was saved", self.name))?;
        Ok(())
    }

    pub fn delete(&self) -> ModelResult<()> {
        self.navigate_to("All")?;
        let ui = self.appliance_ref().ui();
        ui.accept_alert()?;
        ui.click(&format!("[data-row-action=\"{}:delete\"]", self.name))?;
        flash::assert_success(ui, &format!("Tag \"{}\": Delete successful", self.name))?;
        Ok(())
    }
}

impl Subject for Tag {
    fn type_chain(&self) -> Vec<&'static str> {
        vec!["Tag"]
    }

    fn identity(&self) -> Vec<String> {
        vec![self.category.name.clone(), self.name.clone()]
    }

    fn related(&self, attribute: &str) -> Option<SubjectRef> {
        match attribute {
            "category" => Some(Arc::new(self.category.clone()) as SubjectRef),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Navigatable for Tag {
    fn appliance(&self) -> &Arc<Appliance> {
        self.category.appliance()
    }
}

struct CategoryAll;

impl NavStep for CategoryAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("appliance.server", "Configuration")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let category = downcast_subject::<Category>(subject)?;
        category.appliance.ui().click(TAB_CATEGORIES)?;
        Ok(json!({ "page": "categories" }))
    }
}

struct CategoryAdd;

impl NavStep for CategoryAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let category = downcast_subject::<Category>(subject)?;
        category.appliance.ui().click(CATEGORY_ADD)?;
        Ok(json!({ "page": "category-add" }))
    }
}

struct CategoryDetails;

impl NavStep for CategoryDetails {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let category = downcast_subject::<Category>(subject)?;
        category
            .appliance
            .ui()
            .click(&format!("[data-row=\"{}\"]", category.name))?;
        Ok(json!({ "page": "category-details", "category": category.name }))
    }
}

struct CategoryEdit;

impl NavStep for CategoryEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let category = downcast_subject::<Category>(subject)?;
        category.appliance.ui().click(CATEGORY_EDIT)?;
        Ok(json!({ "page": "category-edit" }))
    }
}

struct TagAll;

impl NavStep for TagAll {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::attribute_to("category", "Details")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tag = downcast_subject::<Tag>(subject)?;
        tag.appliance_ref().ui().click(TAB_TAGS)?;
        Ok(json!({ "page": "tags", "category": tag.category.name }))
    }
}

struct TagAdd;

impl NavStep for TagAdd {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tag = downcast_subject::<Tag>(subject)?;
        tag.appliance_ref().ui().click(TAG_ADD)?;
        Ok(json!({ "page": "tag-add" }))
    }
}

struct TagEdit;

impl NavStep for TagEdit {
    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::sibling("All")
    }

    fn execute(&self, subject: &dyn Subject, _args: &NavArgs) -> Result<Value, StepError> {
        let tag = downcast_subject::<Tag>(subject)?;
        let ui = tag.appliance_ref().ui();
        ui.click(&format!("[data-row=\"{}\"]", tag.name))?;
        ui.click("[data-testid=\"tag-edit\"]")?;
        Ok(json!({ "page": "tag-edit" }))
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Category", "All", CategoryAll);
    registry.register("Category", "Add", CategoryAdd);
    registry.register("Category", "Details", CategoryDetails);
    registry.register("Category", "Edit", CategoryEdit);
    registry.register("Tag", "All", TagAll);
    registry.register("Tag", "Add", TagAdd);
    registry.register("Tag", "Edit", TagEdit);
}
