pub struct Table;

// 时间类型固定 19 个字符，YYYY-MM-DD HH:MM:SS
// 手机号码 20 个字符
// 内部 id 为 32 位 md5 十六进制

impl Table {
    /// 团队成员，phone 与 email 均唯一
    ///
    /// permissions 为 JSON 文本
    pub const TEAM_MEMBERS: &'static str = "CREATE TABLE IF NOT EXISTS team_members(
            id VARCHAR(32) NOT NULL,
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(20) NOT NULL,
            email VARCHAR(100) NULL,
            role VARCHAR(20) NOT NULL,
            permissions TEXT NOT NULL,
            created_at VARCHAR(19) NOT NULL,
            updated_at VARCHAR(19) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (phone),
            UNIQUE KEY (email)
        )
    ";
    /// 外部系统同步过来的联系人，contact_id 为外部标识
    pub const CONTACTS: &'static str = "CREATE TABLE IF NOT EXISTS contacts(
            id VARCHAR(32) NOT NULL,
            contact_id VARCHAR(64) NOT NULL,
            name VARCHAR(100) NULL,
            phone VARCHAR(20) NULL,
            email VARCHAR(100) NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (contact_id)
        )
    ";
    pub const CALENDARS: &'static str = "CREATE TABLE IF NOT EXISTS calendars(
            id VARCHAR(32) NOT NULL,
            calendar_id VARCHAR(64) NOT NULL,
            name VARCHAR(100) NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (calendar_id)
        )
    ";
    pub const PIPELINES: &'static str = "CREATE TABLE IF NOT EXISTS pipelines(
            id VARCHAR(32) NOT NULL,
            name VARCHAR(100) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (name)
        )
    ";
    /// 线索，按手机号去重
    pub const LEADS: &'static str = "CREATE TABLE IF NOT EXISTS leads(
            id VARCHAR(32) NOT NULL,
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(20) NOT NULL,
            email VARCHAR(100) NULL,
            source VARCHAR(50) NOT NULL,
            interest TEXT NULL,
            stage VARCHAR(20) NOT NULL,
            pipeline_id VARCHAR(32) NULL,
            contact_id VARCHAR(32) NULL,
            score INT NOT NULL,
            created_at VARCHAR(19) NOT NULL,
            updated_at VARCHAR(19) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (phone),
            FOREIGN KEY (pipeline_id) REFERENCES pipelines(id),
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
    ";
    /// 任务，progress_percentage 取值 0 ~ 100
    pub const TASKS: &'static str = "CREATE TABLE IF NOT EXISTS tasks(
            id VARCHAR(32) NOT NULL,
            task_id VARCHAR(32) NOT NULL,
            title VARCHAR(200) NOT NULL,
            description TEXT NULL,
            status VARCHAR(20) NOT NULL,
            priority VARCHAR(20) NOT NULL,
            progress_percentage INT NOT NULL,
            due_date VARCHAR(10) NULL,
            assigned_to VARCHAR(32) NULL,
            assigned_by VARCHAR(32) NULL,
            contact_id VARCHAR(32) NULL,
            completed_at VARCHAR(19) NULL,
            created_at VARCHAR(19) NOT NULL,
            updated_at VARCHAR(19) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (task_id),
            FOREIGN KEY (assigned_to) REFERENCES team_members(id),
            FOREIGN KEY (assigned_by) REFERENCES team_members(id),
            FOREIGN KEY (contact_id) REFERENCES contacts(id)
        )
    ";
    /// 预约，date 为 YYYY-MM-DD，time 为 HH:MM
    pub const APPOINTMENTS: &'static str = "CREATE TABLE IF NOT EXISTS appointments(
            id VARCHAR(32) NOT NULL,
            appointment_id VARCHAR(32) NOT NULL,
            title VARCHAR(200) NOT NULL,
            description TEXT NULL,
            contact_id VARCHAR(32) NULL,
            assigned_to VARCHAR(32) NULL,
            calendar_id VARCHAR(32) NULL,
            created_by VARCHAR(32) NULL,
            date VARCHAR(10) NOT NULL,
            time VARCHAR(5) NOT NULL,
            duration_minutes INT NOT NULL,
            meeting_type VARCHAR(20) NOT NULL,
            purpose VARCHAR(20) NOT NULL,
            status VARCHAR(20) NOT NULL,
            location VARCHAR(200) NULL,
            created_at VARCHAR(19) NOT NULL,
            updated_at VARCHAR(19) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (appointment_id),
            FOREIGN KEY (contact_id) REFERENCES contacts(id),
            FOREIGN KEY (assigned_to) REFERENCES team_members(id),
            FOREIGN KEY (created_by) REFERENCES team_members(id),
            FOREIGN KEY (calendar_id) REFERENCES calendars(id)
        )
    ";
    /// 工单，ticket_id 格式 TKT-NNNNNN，唯一键用于并发下的冲突重试
    ///
    /// satisfaction 取值 1 ~ 5
    pub const SUPPORT_TICKETS: &'static str = "CREATE TABLE IF NOT EXISTS support_tickets(
            id VARCHAR(32) NOT NULL,
            ticket_id VARCHAR(16) NOT NULL,
            subject VARCHAR(200) NOT NULL,
            description TEXT NOT NULL,
            contact_id VARCHAR(32) NOT NULL,
            assigned_to VARCHAR(32) NULL,
            priority VARCHAR(20) NOT NULL,
            status VARCHAR(20) NOT NULL,
            category VARCHAR(20) NOT NULL,
            satisfaction INT NULL,
            resolution TEXT NULL,
            resolved_at VARCHAR(19) NULL,
            created_at VARCHAR(19) NOT NULL,
            updated_at VARCHAR(19) NOT NULL,
            PRIMARY KEY (id),
            UNIQUE KEY (ticket_id),
            FOREIGN KEY (contact_id) REFERENCES contacts(id),
            FOREIGN KEY (assigned_to) REFERENCES team_members(id)
        )
    ";

    /// 按外键依赖排列
    pub const ALL: [&'static str; 8] = [
        Self::TEAM_MEMBERS,
        Self::CONTACTS,
        Self::CALENDARS,
        Self::PIPELINES,
        Self::LEADS,
        Self::TASKS,
        Self::APPOINTMENTS,
        Self::SUPPORT_TICKETS,
    ];
}
