use super::*;

impl ResourceService {
    /// Validates and persists a new record.
    pub async fn store(&self, input: &FormInput) -> Result<Record, SubmissionError> {
        self.check_submission(input, None).await?;

        let data = self.record_data(input, None)?;
        let unique_values = self.unique_values(&data)?;
        let record = self
            .repository
            .create_record(self.resource(), Value::Object(data), unique_values)
            .await?;

        Ok(record)
    }

    /// Validates and persists changes to an existing record.
    ///
    /// A missing record is fatal; validation failures are recoverable.
    pub async fn update(&self, record_id: &str, input: &FormInput) -> Result<Record, SubmissionError> {
        let existing = self.find_existing(record_id).await?;
        self.check_submission(input, Some(&existing)).await?;

        let data = self.record_data(input, Some(&existing))?;
        let unique_values = self.unique_values(&data)?;
        let record = self
            .repository
            .update_record(self.resource(), record_id, Value::Object(data), unique_values)
            .await?;

        Ok(record)
    }

    /// Deletes a record.
    pub async fn destroy(&self, record_id: &str) -> AppResult<()> {
        self.find_existing(record_id).await?;
        self.repository
            .delete_record(self.resource(), record_id)
            .await
    }

    pub(super) async fn find_existing(&self, record_id: &str) -> AppResult<Record> {
        self.repository
            .find_record(self.resource(), record_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "record '{record_id}' does not exist in resource '{}'",
                    self.resource()
                ))
            })
    }

    async fn check_submission(
        &self,
        input: &FormInput,
        existing: Option<&Record>,
    ) -> Result<(), SubmissionError> {
        let form = self.config.form();
        let mode = if existing.is_some() {
            SubmissionMode::Update
        } else {
            SubmissionMode::Create
        };
        let mut outcome = validate_input(form, input, mode)?;

        for name in &outcome.pending_unique {
            let Some(field) = form.field(name) else {
                continue;
            };
            let Some(raw) = input.get(name) else {
                continue;
            };

            let unique_value = UniqueFieldValue {
                field_name: name.clone(),
                field_value_hash: hash_json_value(&field.field_type().coerce_input(raw))?,
            };
            let owner = self
                .repository
                .find_unique_owner(self.resource(), &unique_value)
                .await?;
            let taken_by_other = owner.is_some_and(|owner| {
                existing.is_none_or(|record| record.id().as_str() != owner)
            });
            if taken_by_other {
                outcome.errors.add(
                    name.clone(),
                    parrot_domain::ValidationRule::Unique.message(field.label_text(), false),
                );
            }
        }

        if outcome.errors.is_empty() {
            return Ok(());
        }

        Err(SubmissionError::Invalid(ValidationFailure {
            errors: outcome.errors,
            old_input: self.old_input(input),
        }))
    }

    /// Drops password values so they are never rendered back.
    pub(super) fn old_input(&self, input: &FormInput) -> FormInput {
        let form = self.config.form();
        input
            .iter()
            .filter(|(key, _)| {
                let base = key.strip_suffix("_confirmation").unwrap_or(key.as_str());
                form.field(base)
                    .is_none_or(|field| field.field_type() != FieldType::Password)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn record_data(
        &self,
        input: &FormInput,
        existing: Option<&Record>,
    ) -> AppResult<Map<String, Value>> {
        let mut data = existing.map(|record| record.data().clone()).unwrap_or_default();

        for field in self.config.form().fields() {
            if !field.field_type().is_input() {
                continue;
            }

            let raw = input.get(field.name()).map(String::as_str);
            if let Some(value) = self.stored_value(field, raw, existing.is_some())? {
                data.insert(field.name().to_owned(), value);
            }
        }

        Ok(data)
    }

    /// Converts one submitted value; `None` leaves the stored value untouched.
    fn stored_value(
        &self,
        field: &FieldDescriptor,
        raw: Option<&str>,
        updating: bool,
    ) -> AppResult<Option<Value>> {
        let field_type = field.field_type();
        let Some(raw) = raw else {
            return Ok(match field_type {
                FieldType::Switch => Some(Value::Bool(false)),
                FieldType::Password => None,
                _ if updating => None,
                _ => Some(field.default().cloned().unwrap_or(Value::Null)),
            });
        };

        let blank = raw.trim().is_empty();
        Ok(match field_type {
            FieldType::Password if blank => None,
            FieldType::Password => Some(Value::String(self.password_hasher.hash_password(raw)?)),
            FieldType::Switch => Some(Value::Bool(
                value_as_flag(&Value::String(raw.to_owned())) == Some(true),
            )),
            FieldType::File if blank && updating => None,
            _ if blank => Some(Value::Null),
            _ => Some(field_type.coerce_input(raw)),
        })
    }

    fn unique_values(&self, data: &Map<String, Value>) -> AppResult<Vec<UniqueFieldValue>> {
        let mut values = Vec::new();
        for field in self.config.form().fields() {
            if !field.is_unique() {
                continue;
            }

            let Some(value) = data.get(field.name()) else {
                continue;
            };
            if value.is_null() || value.as_str().is_some_and(|text| text.trim().is_empty()) {
                continue;
            }

            values.push(UniqueFieldValue {
                field_name: field.name().to_owned(),
                field_value_hash: hash_json_value(value)?,
            });
        }

        values.sort();
        Ok(values)
    }
}
