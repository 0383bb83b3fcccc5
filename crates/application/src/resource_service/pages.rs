use super::*;

impl ResourceService {
    /// Renders the empty create form.
    #[must_use]
    pub fn create(&self) -> FormPage {
        self.form_page(FormTarget::Create, &FormState::new(), None)
    }

    /// Renders the edit form pre-populated with the record's values.
    pub async fn edit(&self, record_id: &str) -> AppResult<FormPage> {
        let record = self.find_existing(record_id).await?;
        let state = FormState::from_record(self.config.form(), &record);
        Ok(self.form_page(FormTarget::Edit(record_id), &state, None))
    }

    /// Renders the record detail page.
    pub async fn show(&self, record_id: &str) -> AppResult<DetailPage> {
        let record = self.find_existing(record_id).await?;

        let mut markup = Markup::raw("<dl class=\"detail-list\">");
        for field in self.config.form().fields() {
            if !field.field_type().is_input() || field.field_type() == FieldType::Password {
                continue;
            }

            let value = record.field_value(field.name()).unwrap_or(Value::Null);
            markup.push_raw(&format!(
                "<dt>{}</dt><dd>{}</dd>",
                escape(field.label_text()),
                escape(&display_value(field, &value))
            ));
        }
        markup.push_raw(&format!(
            "<dt>Created at</dt><dd>{}</dd><dt>Updated at</dt><dd>{}</dd></dl>",
            format_timestamp(record.created_at()),
            format_timestamp(record.updated_at())
        ));

        Ok(DetailPage {
            title: format!("{} details", self.title()),
            record,
            markup,
        })
    }

    /// Renders a rejected submission back into its form with old input, field
    /// errors and an optional error banner.
    #[must_use]
    pub fn render_rejected(
        &self,
        target: FormTarget<'_>,
        old_input: &FormInput,
        errors: &FieldErrors,
        banner: Option<&str>,
    ) -> FormPage {
        let state = FormState::from_input(&self.old_input(old_input), errors.clone());
        self.form_page(target, &state, banner)
    }

    fn form_page(&self, target: FormTarget<'_>, state: &FormState, banner: Option<&str>) -> FormPage {
        let (title, action, method) = match target {
            FormTarget::Create => (
                format!("Create {}", self.title()),
                self.route_prefix().to_owned(),
                HttpMethod::Post,
            ),
            FormTarget::Edit(record_id) => (
                format!("Edit {}", self.title()),
                format!("{}/{record_id}", self.route_prefix()),
                HttpMethod::Put,
            ),
        };

        let mut markup = Markup::default();
        if let Some(banner) = banner {
            markup.push_raw(&format!(
                "<div class=\"alert alert-danger\" role=\"alert\">{}</div>",
                escape(banner)
            ));
        }
        if !state.errors().is_empty() {
            markup.push_raw(
                "<div class=\"alert alert-warning\" role=\"alert\">Please correct the highlighted fields.</div>",
            );
        }
        markup.push(&self.config.form().render(state));

        FormPage {
            title,
            description: self.config.description().map(str::to_owned),
            action,
            method,
            markup,
        }
    }
}

fn display_value(field: &FieldDescriptor, value: &Value) -> String {
    match field.field_type() {
        FieldType::Switch => match value_as_flag(value) {
            Some(true) => "Yes".to_owned(),
            _ => "No".to_owned(),
        },
        FieldType::Select => {
            let text = value_to_text(value);
            field
                .option_map()
                .get(&text)
                .cloned()
                .unwrap_or(text)
        }
        _ => value_to_text(value),
    }
}
