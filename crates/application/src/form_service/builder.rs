use super::*;

/// Accumulates fields, tabs and content blocks into a [`Form`].
#[derive(Debug, Default)]
pub struct FormBuilder {
    fields: IndexMap<String, FieldDescriptor>,
    flat: Vec<FormItem>,
    tabs: Vec<Tab>,
    custom_html_count: usize,
    error: Option<AppError>,
}

/// Tab scope opened by [`FormBuilder::tab`] and closed by [`TabBuilder::end`].
#[derive(Debug)]
pub struct TabBuilder {
    form: FormBuilder,
    index: usize,
}

/// Shared field and content-block DSL for forms and tab scopes.
pub trait FieldContainer: Sized {
    /// Places a fully configured descriptor in the current scope.
    fn push_field(self, field: FieldDescriptor) -> Self;

    /// Places a content block in the current scope.
    fn push_block(self, block: ContentBlock) -> Self;

    /// Records a configuration error reported by `build()`.
    fn fail(self, error: AppError) -> Self;

    /// Returns the number of custom HTML fields declared so far.
    fn next_custom_html_index(&mut self) -> usize;

    /// Appends a field of the given type configured by `configure`.
    fn field<F>(self, field_type: FieldType, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.push_field(configure(FieldDescriptor::new(field_type, name)))
    }

    /// Appends a field whose type is given by name, such as `"email"`.
    fn field_of_type<F>(self, type_name: &str, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        match type_name.parse::<FieldType>() {
            Ok(field_type) => self.field(field_type, name, configure),
            Err(AppError::Configuration(message)) => self.fail(AppError::Configuration(format!(
                "{message} for field '{name}'"
            ))),
            Err(error) => self.fail(error),
        }
    }

    /// Single-line text input.
    fn text<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Text, name, configure)
    }

    /// Multi-line text input.
    fn textarea<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Textarea, name, configure)
    }

    /// Email input.
    fn email<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Email, name, configure)
    }

    /// Password input, hashed before save.
    fn password<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Password, name, configure)
    }

    /// Numeric input.
    fn number<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Number, name, configure)
    }

    /// Select box; configure options with `FieldDescriptor::options`.
    fn select<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Select, name, configure)
    }

    /// On/off switch.
    fn switch<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Switch, name, configure)
    }

    /// Date picker.
    fn date<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Date, name, configure)
    }

    /// Date and time picker.
    fn datetime<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::DateTime, name, configure)
    }

    /// URL input.
    fn url<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Url, name, configure)
    }

    /// Color picker.
    fn color<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Color, name, configure)
    }

    /// Hidden input.
    fn hidden<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::Hidden, name, configure)
    }

    /// File input storing an identifier string.
    fn file<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::File, name, configure)
    }

    /// Rich text editor.
    fn rich_text<F>(self, name: &str, configure: F) -> Self
    where
        F: FnOnce(FieldDescriptor) -> FieldDescriptor,
    {
        self.field(FieldType::RichText, name, configure)
    }

    /// Non-input field that renders trusted markup.
    fn custom_html(mut self, html: &str, label: &str, wrapper_class: Option<&str>) -> Self {
        let index = self.next_custom_html_index();
        let mut field = FieldDescriptor::new(FieldType::CustomHtml, format!("custom_html_{index}"))
            .label(label)
            .meta("html", Value::String(html.to_owned()));
        if let Some(class) = wrapper_class {
            field = field.wrapper_class(class);
        }

        self.push_field(field)
    }

    /// Horizontal rule with an optional caption.
    fn divider(self, label: Option<&str>) -> Self {
        self.push_block(ContentBlock::Divider {
            label: label.map(str::to_owned),
        })
    }

    /// Highlighted message.
    fn alert(self, level: AlertLevel, message: &str) -> Self {
        self.push_block(ContentBlock::Alert {
            level,
            message: message.to_owned(),
        })
    }

    /// Trusted raw markup.
    fn html(self, content: &str) -> Self {
        self.push_block(ContentBlock::Html {
            content: content.to_owned(),
        })
    }
}

impl FormBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a tab scope; fields added until `end()` land in this tab.
    #[must_use]
    pub fn tab(mut self, key: &str, label: &str, icon: Option<&str>) -> TabBuilder {
        if self
            .tabs
            .iter()
            .any(|tab| tab.key().as_str() == key.trim())
        {
            let error = AppError::Configuration(format!("duplicate tab key '{}'", key.trim()));
            return self.open_detached(error);
        }

        match Tab::new(key.trim(), label, icon.map(str::to_owned)) {
            Ok(tab) => {
                self.tabs.push(tab);
                let index = self.tabs.len() - 1;
                TabBuilder { form: self, index }
            }
            Err(_) => {
                self.open_detached(AppError::Configuration("tab key must not be empty".to_owned()))
            }
        }
    }

    /// Validates the declarations and produces the immutable form.
    pub fn build(self) -> AppResult<Form> {
        if let Some(error) = self.error {
            return Err(error);
        }

        for field in self.fields.values() {
            field.validate()?;
        }

        if !self.tabs.is_empty() && !self.flat.is_empty() {
            let offending = self
                .flat
                .iter()
                .find_map(|item| match item {
                    FormItem::Field(name) => Some(format!("field '{name}'")),
                    FormItem::Block(_) => None,
                })
                .unwrap_or_else(|| "a content block".to_owned());
            return Err(AppError::Configuration(format!(
                "{offending} is declared outside a tab in a tabbed form"
            )));
        }

        let layout = if self.tabs.is_empty() {
            FormLayout::Flat(self.flat)
        } else {
            FormLayout::Tabbed(self.tabs)
        };

        Ok(Form {
            fields: self.fields,
            layout,
        })
    }

    fn open_detached(mut self, error: AppError) -> TabBuilder {
        self.error.get_or_insert(error);
        let index = self.tabs.len();
        TabBuilder { form: self, index }
    }

    fn place(&mut self, scope: Option<usize>, field: FieldDescriptor) {
        let name = field.name().to_owned();
        if self.fields.shift_remove(&name).is_some() {
            self.flat
                .retain(|item| !matches!(item, FormItem::Field(existing) if *existing == name));
            for tab in &mut self.tabs {
                tab.remove_field(&name);
            }
        }

        self.fields.insert(name.clone(), field);
        self.push_item(scope, FormItem::Field(name));
    }

    fn push_item(&mut self, scope: Option<usize>, item: FormItem) {
        match scope.and_then(|index| self.tabs.get_mut(index)) {
            Some(tab) => tab.push(item),
            None if scope.is_some() => {}
            None => self.flat.push(item),
        }
    }
}

impl FieldContainer for FormBuilder {
    fn push_field(mut self, field: FieldDescriptor) -> Self {
        self.place(None, field);
        self
    }

    fn push_block(mut self, block: ContentBlock) -> Self {
        self.push_item(None, FormItem::Block(block));
        self
    }

    fn fail(mut self, error: AppError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    fn next_custom_html_index(&mut self) -> usize {
        let index = self.custom_html_count;
        self.custom_html_count += 1;
        index
    }
}

impl TabBuilder {
    /// Closes the tab scope.
    #[must_use]
    pub fn end(self) -> FormBuilder {
        self.form
    }
}

impl FieldContainer for TabBuilder {
    fn push_field(mut self, field: FieldDescriptor) -> Self {
        self.form.place(Some(self.index), field);
        self
    }

    fn push_block(mut self, block: ContentBlock) -> Self {
        self.form.push_item(Some(self.index), FormItem::Block(block));
        self
    }

    fn fail(mut self, error: AppError) -> Self {
        self.form.error.get_or_insert(error);
        self
    }

    fn next_custom_html_index(&mut self) -> usize {
        self.form.next_custom_html_index()
    }
}
