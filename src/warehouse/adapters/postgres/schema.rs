//! Diesel schema for warehouse task persistence.

diesel::table! {
    /// Warehouse task records.
    warehouse_tasks (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Unique human-readable task code.
        #[max_length = 32]
        code -> Varchar,
        /// Optional shop identifier.
        shop_id -> Nullable<Int8>,
        /// Fulfilment channel.
        #[max_length = 16]
        task_type -> Varchar,
        /// Label requirement.
        #[max_length = 32]
        label_type -> Varchar,
        /// Optional deadline.
        deadline_at -> Nullable<Timestamptz>,
        /// Urgency from 1 to 5.
        priority -> Int2,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Exception branch flag.
        is_exception -> Bool,
        /// Exception reason.
        #[max_length = 50]
        exception_type -> Nullable<Varchar>,
        /// Active flag.
        active -> Bool,
        /// Short title.
        subject -> Nullable<Text>,
        /// Work description.
        description -> Nullable<Text>,
        /// Internal remark.
        remark -> Nullable<Text>,
        /// Operator comment.
        comment -> Nullable<Text>,
        /// Document references as a JSON array.
        documents -> Jsonb,
        /// Image references as a JSON array.
        images -> Jsonb,
        /// Open attribute map.
        extra -> Jsonb,
        /// Executing operator.
        #[max_length = 255]
        executor -> Nullable<Varchar>,
        /// First entry into picking.
        executing_at -> Nullable<Timestamptz>,
        /// First entry into ready.
        ready_at -> Nullable<Timestamptz>,
        /// Entry into completed.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Creating operator.
        #[max_length = 255]
        created_by -> Varchar,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Last updating operator.
        #[max_length = 255]
        updated_by -> Varchar,
    }
}

diesel::table! {
    /// Append-only transition log.
    warehouse_task_action_logs (id) {
        /// Store-assigned log identifier.
        id -> Int8,
        /// Task the transition was applied to.
        task_id -> Int8,
        /// Task code at transition time.
        #[max_length = 32]
        task_code -> Varchar,
        /// Action verb.
        #[max_length = 50]
        action -> Varchar,
        /// Status before the transition.
        #[max_length = 50]
        from_status -> Varchar,
        /// Status after the transition.
        #[max_length = 50]
        to_status -> Varchar,
        /// Acting operator.
        #[max_length = 255]
        operator -> Varchar,
        /// Optional comment.
        comment -> Nullable<Text>,
        /// Transition timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(warehouse_task_action_logs -> warehouse_tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(warehouse_tasks, warehouse_task_action_logs);
