//! 权限组及其动作

pub fn groups() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("leads", LEADS.to_vec()),
        ("tasks", TASKS.to_vec()),
        ("appointments", APPOINTMENTS.to_vec()),
        ("tickets", TICKETS.to_vec()),
        ("team", TEAM.to_vec()),
        ("ai_agent", AI_AGENT.to_vec()),
        ("automations", AUTOMATIONS.to_vec()),
        ("courses", COURSES.to_vec()),
    ]
}

pub struct Action;

impl Action {
    pub const VIEW: &'static str = "view";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    /// 分配给其他成员
    pub const ASSIGN: &'static str = "assign";
    pub const EXPORT: &'static str = "export";
    /// 修改成员角色
    pub const CHANGE_ROLE: &'static str = "change_role";
    pub const CONFIGURE: &'static str = "configure";
}

pub static LEADS: [&str; 5] = [
    Action::VIEW,
    Action::CREATE,
    Action::UPDATE,
    Action::DELETE,
    Action::EXPORT,
];

pub static TASKS: [&str; 5] = [
    Action::VIEW,
    Action::CREATE,
    Action::UPDATE,
    Action::DELETE,
    Action::ASSIGN,
];

pub static APPOINTMENTS: [&str; 5] = [
    Action::VIEW,
    Action::CREATE,
    Action::UPDATE,
    Action::DELETE,
    Action::ASSIGN,
];

pub static TICKETS: [&str; 5] = [
    Action::VIEW,
    Action::CREATE,
    Action::UPDATE,
    Action::DELETE,
    Action::ASSIGN,
];

pub static TEAM: [&str; 5] = [
    Action::VIEW,
    Action::CREATE,
    Action::UPDATE,
    Action::DELETE,
    Action::CHANGE_ROLE,
];

pub static AI_AGENT: [&str; 2] = [Action::VIEW, Action::CONFIGURE];

pub static AUTOMATIONS: [&str; 2] = [Action::VIEW, Action::CONFIGURE];

pub static COURSES: [&str; 4] = [Action::VIEW, Action::CREATE, Action::UPDATE, Action::DELETE];
