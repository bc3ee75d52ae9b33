/**
 * Responsibility
 *  - コレクションごとの「意味付きID型」を宣言する
 *  - decode ロジック / extractor 実装はここに置かない
 */
use super::core::PublicId;

pub enum UserTag {}
pub type PublicUserId = PublicId<UserTag>;

pub enum ClassTag {}
pub type PublicClassId = PublicId<ClassTag>;

pub enum AssignmentTag {}
pub type PublicAssignmentId = PublicId<AssignmentTag>;

pub enum InstructorRequestTag {}
pub type PublicInstructorRequestId = PublicId<InstructorRequestTag>;

pub enum PaymentTag {}
pub type PublicPaymentId = PublicId<PaymentTag>;
