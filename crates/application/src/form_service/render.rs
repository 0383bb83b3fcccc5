use super::*;

impl Form {
    /// Renders the form body: a flat field list, or a tab container with one
    /// pane per tab.
    #[must_use]
    pub fn render(&self, state: &FormState) -> Markup {
        let mut markup = Markup::default();
        match &self.layout {
            FormLayout::Flat(items) => {
                markup.push_raw("<div class=\"form-fields\">");
                self.render_items(&mut markup, items, state);
                markup.push_raw("</div>");
            }
            FormLayout::Tabbed(tabs) => {
                markup.push_raw("<div class=\"tabs\"><ul class=\"tab-nav\" role=\"tablist\">");
                for (position, tab) in tabs.iter().enumerate() {
                    let key = escape(tab.key().as_str());
                    let active = if position == 0 { " active" } else { "" };
                    let has_errors = tab
                        .field_names()
                        .any(|name| state.errors().has(name));
                    let error_class = if has_errors { " has-errors" } else { "" };
                    markup.push_raw(&format!(
                        "<li class=\"tab-link{active}{error_class}\" role=\"tab\" data-tab=\"{key}\">"
                    ));
                    if let Some(icon) = tab.icon() {
                        markup.push_raw(&format!("<i class=\"icon icon-{}\"></i> ", escape(icon)));
                    }
                    markup.push_raw(&escape(tab.label()));
                    markup.push_raw("</li>");
                }
                markup.push_raw("</ul>");

                for (position, tab) in tabs.iter().enumerate() {
                    let active = if position == 0 { " active" } else { "" };
                    markup.push_raw(&format!(
                        "<section class=\"tab-pane{active}\" id=\"tab-{}\" role=\"tabpanel\">",
                        escape(tab.key().as_str())
                    ));
                    self.render_items(&mut markup, tab.items(), state);
                    markup.push_raw("</section>");
                }
                markup.push_raw("</div>");
            }
        }

        markup
    }

    /// Renders a single field widget, or `None` for unknown names.
    #[must_use]
    pub fn render_field(&self, name: &str, state: &FormState) -> Option<Markup> {
        self.fields
            .get(name)
            .map(|field| field_widget(field, state))
    }

    fn render_items(&self, markup: &mut Markup, items: &[FormItem], state: &FormState) {
        for item in items {
            match item {
                FormItem::Field(name) => {
                    if let Some(field) = self.fields.get(name) {
                        markup.push(&field_widget(field, state));
                    }
                }
                FormItem::Block(block) => markup.push(&render_block(block)),
            }
        }
    }
}

fn render_block(block: &ContentBlock) -> Markup {
    match block {
        ContentBlock::Divider { label: Some(label) } => Markup::raw(format!(
            "<div class=\"form-divider\"><span>{}</span></div>",
            escape(label)
        )),
        ContentBlock::Divider { label: None } => Markup::raw("<hr class=\"form-divider\">"),
        ContentBlock::Alert { level, message } => Markup::raw(format!(
            "<div class=\"alert alert-{}\" role=\"alert\">{}</div>",
            level.as_str(),
            escape(message)
        )),
        ContentBlock::Html { content } => Markup::raw(content.clone()),
    }
}

fn field_widget(field: &FieldDescriptor, state: &FormState) -> Markup {
    let name = escape(field.name());
    let field_type = field.field_type();

    if field_type == FieldType::CustomHtml {
        let html = field
            .metadata("html")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Markup::raw(format!(
            "<div class=\"custom-html{}\">{html}</div>",
            wrapper_suffix(field)
        ));
    }

    let value = current_value(field, state);
    if field_type == FieldType::Hidden {
        return Markup::raw(format!(
            "<input type=\"hidden\" id=\"field-{name}\" name=\"{name}\" value=\"{}\">",
            escape(&value)
        ));
    }

    let error = state.errors().first(field.name());
    let invalid = if error.is_some() { " is-invalid" } else { "" };
    let required = if field.is_required() { " required" } else { "" };
    let placeholder = field
        .placeholder_text()
        .map(|text| format!(" placeholder=\"{}\"", escape(text)))
        .unwrap_or_default();

    let mut markup = Markup::raw(format!(
        "<div class=\"form-group{}\" data-field=\"{name}\">",
        wrapper_suffix(field)
    ));
    let marker = if field.is_required() {
        " <span class=\"required\">*</span>"
    } else {
        ""
    };
    markup.push_raw(&format!(
        "<label for=\"field-{name}\">{}{marker}</label>",
        escape(field.label_text())
    ));

    let control = match field_type {
        FieldType::Textarea | FieldType::RichText => {
            let rows = field
                .metadata("rows")
                .and_then(Value::as_u64)
                .unwrap_or(4);
            let editor = if field_type == FieldType::RichText {
                let height = field
                    .metadata("height")
                    .and_then(Value::as_u64)
                    .unwrap_or(300);
                format!(" data-editor=\"richtext\" data-height=\"{height}\"")
            } else {
                String::new()
            };
            format!(
                "<textarea class=\"form-control{invalid}\" id=\"field-{name}\" name=\"{name}\" rows=\"{rows}\"{editor}{placeholder}{required}>{}</textarea>",
                escape(&value)
            )
        }
        FieldType::Select => {
            let mut options = String::from("<option value=\"\">-- Select --</option>");
            for (option_value, option_label) in field.option_map() {
                let selected = if *option_value == value { " selected" } else { "" };
                options.push_str(&format!(
                    "<option value=\"{}\"{selected}>{}</option>",
                    escape(option_value),
                    escape(option_label)
                ));
            }
            format!(
                "<select class=\"form-control{invalid}\" id=\"field-{name}\" name=\"{name}\"{required}>{options}</select>"
            )
        }
        FieldType::Switch => {
            let checked = if is_checked(field, state) { " checked" } else { "" };
            format!(
                "<input type=\"hidden\" name=\"{name}\" value=\"0\"><input type=\"checkbox\" class=\"form-switch{invalid}\" id=\"field-{name}\" name=\"{name}\" value=\"1\"{checked}>"
            )
        }
        FieldType::File => {
            let accept = field
                .metadata("accept")
                .and_then(Value::as_str)
                .map(|accept| format!(" accept=\"{}\"", escape(accept)))
                .unwrap_or_default();
            let current = if value.is_empty() {
                String::new()
            } else {
                format!("<span class=\"current-file\">{}</span>", escape(&value))
            };
            format!(
                "<input type=\"file\" class=\"form-control{invalid}\" id=\"field-{name}\" name=\"{name}\"{accept}>{current}"
            )
        }
        FieldType::Password => format!(
            "<input type=\"password\" class=\"form-control{invalid}\" id=\"field-{name}\" name=\"{name}\" value=\"\" autocomplete=\"new-password\"{placeholder}>"
        ),
        _ => format!(
            "<input type=\"{}\" class=\"form-control{invalid}\" id=\"field-{name}\" name=\"{name}\" value=\"{}\"{placeholder}{required}>",
            input_type(field_type),
            escape(&value)
        ),
    };
    markup.push_raw(&control);

    if let Some(help) = field.help_text() {
        markup.push_raw(&format!("<small class=\"form-help\">{}</small>", escape(help)));
    }
    if let Some(error) = error {
        markup.push_raw(&format!(
            "<div class=\"invalid-feedback\">{}</div>",
            escape(error)
        ));
    }
    markup.push_raw("</div>");

    markup
}

fn input_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Email => "email",
        FieldType::Number => "number",
        FieldType::Date => "date",
        FieldType::DateTime => "datetime-local",
        FieldType::Url => "url",
        FieldType::Color => "color",
        _ => "text",
    }
}

fn current_value(field: &FieldDescriptor, state: &FormState) -> String {
    if field.field_type() == FieldType::Password {
        return String::new();
    }

    state
        .value(field.name())
        .or_else(|| field.default())
        .map(value_to_text)
        .unwrap_or_default()
}

fn is_checked(field: &FieldDescriptor, state: &FormState) -> bool {
    state
        .value(field.name())
        .or_else(|| field.default())
        .and_then(value_as_flag)
        .unwrap_or(false)
}

fn wrapper_suffix(field: &FieldDescriptor) -> String {
    field
        .metadata("wrapper_class")
        .and_then(Value::as_str)
        .map(|class| format!(" {}", escape(class)))
        .unwrap_or_default()
}
